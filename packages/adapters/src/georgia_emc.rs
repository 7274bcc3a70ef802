use std::collections::BTreeMap;

use crate::result::AdapterResult;

/// Single-EMC counties are unambiguous and score higher than counties
/// split between multiple EMC service areas.
const SINGLE_EMC_CONFIDENCE: f64 = 0.87;
const MULTI_EMC_CONFIDENCE: f64 = 0.72;

/// Georgia Electric Membership Cooperative territory by county. Georgia
/// electric deregulation works at the LDC/marketer level for gas but not
/// electric; EMCs are the authoritative electric provider for most rural
/// Georgia counties where no state GIS layer exists.
pub struct GeorgiaEmcAdapter {
    by_county: BTreeMap<String, Vec<String>>,
}

impl GeorgiaEmcAdapter {
    /// # Panics
    ///
    /// Panics if the embedded table is malformed.
    #[must_use]
    pub fn embedded() -> Self {
        let by_county: BTreeMap<String, Vec<String>> =
            serde_json::from_str(include_str!("../data/georgia_emc_counties.json"))
                .expect("embedded Georgia EMC county map must be valid JSON");
        Self { by_county }
    }

    /// May return multiple candidates when a county is split between
    /// EMC service areas.
    #[must_use]
    pub fn lookup(&self, county: &str) -> Vec<AdapterResult> {
        let Some(names) = self.by_county.get(county) else {
            return Vec::new();
        };

        let confidence = if names.len() == 1 {
            SINGLE_EMC_CONFIDENCE
        } else {
            MULTI_EMC_CONFIDENCE
        };

        names
            .iter()
            .map(|name| AdapterResult::new(name.clone(), "georgia_emc", confidence).with_state("GA"))
            .collect()
    }
}
