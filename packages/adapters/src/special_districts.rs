use serde::Deserialize;

use crate::result::AdapterResult;

const CONFIDENCE: f64 = 0.82;

#[derive(Debug, Clone, Deserialize)]
struct SpecialDistrictEntry {
    zip: String,
    name: String,
}

/// ZIP-keyed special water/utility districts (municipal utility
/// districts, water control and improvement districts) that HIFLD's
/// general water layer frequently misses. Water only.
pub struct SpecialDistrictsAdapter {
    entries: Vec<SpecialDistrictEntry>,
}

impl SpecialDistrictsAdapter {
    /// # Panics
    ///
    /// Panics if the embedded table is malformed.
    #[must_use]
    pub fn embedded() -> Self {
        let entries: Vec<SpecialDistrictEntry> =
            serde_json::from_str(include_str!("../data/special_districts.json"))
                .expect("embedded special districts map must be valid JSON");
        Self { entries }
    }

    #[must_use]
    pub fn lookup(&self, zip: &str) -> Option<AdapterResult> {
        self.entries
            .iter()
            .find(|e| e.zip == zip)
            .map(|entry| AdapterResult::new(entry.name.clone(), "special_districts", CONFIDENCE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_configured_district() {
        let adapter = SpecialDistrictsAdapter::embedded();
        let hit = adapter.lookup("77494").unwrap();
        assert_eq!(hit.name, "Harris County MUD 50");
        assert_eq!(hit.confidence, CONFIDENCE);
    }

    #[test]
    fn unknown_zip_returns_none() {
        let adapter = SpecialDistrictsAdapter::embedded();
        assert!(adapter.lookup("00000").is_none());
    }
}
