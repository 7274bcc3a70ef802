use serde::Deserialize;
use utility_lookup_models::UtilityType;

use crate::result::AdapterResult;

#[derive(Debug, Clone, Deserialize)]
struct RemainingStateEntry {
    state: String,
    zip: String,
    utility_type: UtilityType,
    name: String,
    confidence: f64,
}

/// Dominance-weighted fallback ZIP map for states with neither a usable
/// state GIS layer nor a narrower adapter. Coverage is necessarily
/// sparse; confidence is capped below state GIS / HIFLD sources.
pub struct RemainingStatesZipAdapter {
    entries: Vec<RemainingStateEntry>,
}

impl RemainingStatesZipAdapter {
    /// # Panics
    ///
    /// Panics if the embedded table is malformed.
    #[must_use]
    pub fn embedded() -> Self {
        let entries: Vec<RemainingStateEntry> =
            serde_json::from_str(include_str!("../data/remaining_states_zip.json"))
                .expect("embedded remaining-states ZIP map must be valid JSON");
        Self { entries }
    }

    #[must_use]
    pub fn lookup(&self, state: &str, zip: &str, utility_type: UtilityType) -> Option<AdapterResult> {
        self.entries
            .iter()
            .find(|e| {
                e.state.eq_ignore_ascii_case(state) && e.zip == zip && e.utility_type == utility_type
            })
            .map(|entry| {
                AdapterResult::new(entry.name.clone(), "remaining_states_zip", entry.confidence)
                    .with_state(entry.state.clone())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_configured_zip() {
        let adapter = RemainingStatesZipAdapter::embedded();
        let hit = adapter
            .lookup("WA", "98101", UtilityType::Electric)
            .unwrap();
        assert_eq!(hit.name, "Seattle City Light");
    }

    #[test]
    fn utility_type_mismatch_returns_none() {
        let adapter = RemainingStatesZipAdapter::embedded();
        assert!(adapter.lookup("WA", "98101", UtilityType::Gas).is_none());
    }
}
