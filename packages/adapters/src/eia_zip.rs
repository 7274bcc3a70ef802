use serde::Deserialize;

use crate::result::AdapterResult;

const CONFIDENCE: f64 = 0.70;

#[derive(Debug, Clone, Deserialize)]
struct EiaZipEntry {
    zip: String,
    name: String,
}

/// EIA-861 service-territory ZIP fallback. Electric only; consulted
/// after state GIS and before the FindEnergy city map, since EIA's
/// territory assignment is coarser than a state's own GIS layer but
/// still authoritative-sourced (not scraped).
pub struct EiaZipAdapter {
    entries: Vec<EiaZipEntry>,
}

impl EiaZipAdapter {
    /// # Panics
    ///
    /// Panics if the embedded table is malformed.
    #[must_use]
    pub fn embedded() -> Self {
        let entries: Vec<EiaZipEntry> = serde_json::from_str(include_str!("../data/eia_zip.json"))
            .expect("embedded EIA ZIP map must be valid JSON");
        Self { entries }
    }

    #[must_use]
    pub fn lookup(&self, zip: &str) -> Option<AdapterResult> {
        self.entries
            .iter()
            .find(|e| e.zip == zip)
            .map(|entry| AdapterResult::new(entry.name.clone(), "eia_zip", CONFIDENCE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_configured_zip() {
        let adapter = EiaZipAdapter::embedded();
        let hit = adapter.lookup("75201").unwrap();
        assert_eq!(hit.name, "Oncor Electric Delivery");
        assert_eq!(hit.confidence, CONFIDENCE);
    }
}
