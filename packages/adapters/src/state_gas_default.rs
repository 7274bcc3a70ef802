use std::collections::BTreeMap;

use serde::Deserialize;

use crate::result::AdapterResult;

#[derive(Debug, Clone, Deserialize)]
struct DefaultEntry {
    name: String,
    confidence: f64,
}

/// Last-resort statewide default gas provider, consulted only when no
/// other gas adapter and no spatial candidate produced a hit. Low
/// confidence by construction (0.40-0.65 per-state).
pub struct StateGasDefaultAdapter {
    by_state: BTreeMap<String, DefaultEntry>,
}

impl StateGasDefaultAdapter {
    /// # Panics
    ///
    /// Panics if the embedded table is malformed.
    #[must_use]
    pub fn embedded() -> Self {
        let by_state: BTreeMap<String, DefaultEntry> =
            serde_json::from_str(include_str!("../data/state_gas_defaults.json"))
                .expect("embedded state gas defaults must be valid JSON");
        Self { by_state }
    }

    #[must_use]
    pub fn lookup(&self, state: &str) -> Option<AdapterResult> {
        self.by_state.get(&state.to_uppercase()).map(|entry| {
            AdapterResult::new(entry.name.clone(), "state_gas_default", entry.confidence)
                .with_state(state.to_uppercase())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_configured_state_default() {
        let adapter = StateGasDefaultAdapter::embedded();
        let hit = adapter.lookup("tx").unwrap();
        assert_eq!(hit.name, "Atmos Energy");
    }

    #[test]
    fn unknown_state_returns_none() {
        let adapter = StateGasDefaultAdapter::embedded();
        assert!(adapter.lookup("ZZ").is_none());
    }
}
