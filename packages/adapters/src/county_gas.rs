use serde::Deserialize;

use crate::result::AdapterResult;

const COUNTY_CONFIDENCE: f64 = 0.85;
const CITY_OVERRIDE_CONFIDENCE: f64 = 0.88;

#[derive(Debug, Clone, Deserialize)]
struct CountyEntry {
    state: String,
    county: String,
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CityOverride {
    state: String,
    city: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CountyGasTable {
    by_county: Vec<CountyEntry>,
    city_overrides: Vec<CityOverride>,
}

/// Maps (state, county) to a gas LDC, with per-city overrides for cities
/// that split from their county's default provider.
pub struct CountyGasAdapter {
    table: CountyGasTable,
}

impl CountyGasAdapter {
    /// # Panics
    ///
    /// Panics if the embedded table is malformed.
    #[must_use]
    pub fn embedded() -> Self {
        let table: CountyGasTable =
            serde_json::from_str(include_str!("../data/county_gas_map.json"))
                .expect("embedded county gas map must be valid JSON");
        Self { table }
    }

    #[must_use]
    pub fn lookup(&self, state: &str, county: &str, city: Option<&str>) -> Option<AdapterResult> {
        if let Some(city) = city
            && let Some(entry) = self
                .table
                .city_overrides
                .iter()
                .find(|e| e.state.eq_ignore_ascii_case(state) && e.city.eq_ignore_ascii_case(city))
        {
            return Some(
                AdapterResult::new(entry.name.clone(), "county_gas_city", CITY_OVERRIDE_CONFIDENCE)
                    .with_state(entry.state.clone()),
            );
        }

        self.table
            .by_county
            .iter()
            .find(|e| e.state.eq_ignore_ascii_case(state) && e.county.eq_ignore_ascii_case(county))
            .map(|entry| {
                AdapterResult::new(entry.name.clone(), "county_gas_county", COUNTY_CONFIDENCE)
                    .with_state(entry.state.clone())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_override_beats_county_default() {
        let adapter = CountyGasAdapter::embedded();
        let hit = adapter
            .lookup("OH", "Franklin", Some("Columbus"))
            .unwrap();
        assert_eq!(hit.source, "county_gas_city");
        assert_eq!(hit.confidence, CITY_OVERRIDE_CONFIDENCE);
    }

    #[test]
    fn falls_back_to_county_when_no_city_override() {
        let adapter = CountyGasAdapter::embedded();
        let hit = adapter.lookup("OH", "Cuyahoga", Some("Cleveland")).unwrap();
        assert_eq!(hit.source, "county_gas_county");
        assert_eq!(hit.name, "Dominion Energy Ohio");
    }
}
