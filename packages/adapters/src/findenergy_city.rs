use serde::Deserialize;
use utility_lookup_models::UtilityType;

use crate::result::AdapterResult;

const CONFIDENCE: f64 = 0.65;

#[derive(Debug, Clone, Deserialize)]
struct FindEnergyCityEntry {
    state: String,
    city: String,
    utility_type: UtilityType,
    name: String,
}

/// Crowd-sourced city-level utility directory, scraped from FindEnergy.
/// Lowest-confidence non-default source; consulted only when every
/// higher-authority adapter comes up empty.
pub struct FindEnergyCityAdapter {
    entries: Vec<FindEnergyCityEntry>,
}

impl FindEnergyCityAdapter {
    /// # Panics
    ///
    /// Panics if the embedded table is malformed.
    #[must_use]
    pub fn embedded() -> Self {
        let entries: Vec<FindEnergyCityEntry> =
            serde_json::from_str(include_str!("../data/findenergy_city.json"))
                .expect("embedded FindEnergy city map must be valid JSON");
        Self { entries }
    }

    #[must_use]
    pub fn lookup(&self, state: &str, city: &str, utility_type: UtilityType) -> Option<AdapterResult> {
        self.entries
            .iter()
            .find(|e| {
                e.state.eq_ignore_ascii_case(state)
                    && e.city.eq_ignore_ascii_case(city)
                    && e.utility_type == utility_type
            })
            .map(|entry| {
                AdapterResult::new(entry.name.clone(), "findenergy_city", CONFIDENCE)
                    .with_state(entry.state.clone())
            })
    }
}
