use serde::Deserialize;

use crate::result::AdapterResult;

#[derive(Debug, Clone, Deserialize)]
struct GasZipEntry {
    state: String,
    /// Either a 5-digit ZIP or a 3-digit prefix.
    zip: String,
    name: String,
    confidence: f64,
}

/// Maps (state, ZIP) to a gas utility. 5-digit entries take precedence
/// over 3-digit prefix entries for the same ZIP.
pub struct GasZipAdapter {
    entries: Vec<GasZipEntry>,
}

impl GasZipAdapter {
    /// # Panics
    ///
    /// Panics if the embedded table is malformed.
    #[must_use]
    pub fn embedded() -> Self {
        let entries: Vec<GasZipEntry> =
            serde_json::from_str(include_str!("../data/gas_zip_map.json"))
                .expect("embedded gas ZIP map must be valid JSON");
        Self { entries }
    }

    #[must_use]
    pub fn lookup(&self, state: &str, zip5: &str) -> Option<AdapterResult> {
        if zip5.len() < 3 {
            return None;
        }
        let zip3 = &zip5[..3];

        let exact = self
            .entries
            .iter()
            .find(|e| e.state.eq_ignore_ascii_case(state) && e.zip == zip5);
        if let Some(entry) = exact {
            return Some(
                AdapterResult::new(entry.name.clone(), "gas_zip_5", entry.confidence)
                    .with_state(entry.state.clone()),
            );
        }

        self.entries
            .iter()
            .find(|e| e.state.eq_ignore_ascii_case(state) && e.zip == zip3)
            .map(|entry| {
                AdapterResult::new(entry.name.clone(), "gas_zip_3", entry.confidence)
                    .with_state(entry.state.clone())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_digit_match_beats_three_digit() {
        let adapter = GasZipAdapter::embedded();
        let hit = adapter.lookup("IL", "60601").unwrap();
        assert_eq!(hit.source, "gas_zip_5");
        assert_eq!(hit.confidence, 0.93);
    }

    #[test]
    fn falls_back_to_three_digit_prefix() {
        let adapter = GasZipAdapter::embedded();
        let hit = adapter.lookup("IL", "60602").unwrap();
        assert_eq!(hit.source, "gas_zip_3");
        assert_eq!(hit.name, "Peoples Gas");
    }

    #[test]
    fn unknown_state_returns_none() {
        let adapter = GasZipAdapter::embedded();
        assert!(adapter.lookup("ZZ", "00000").is_none());
    }
}
