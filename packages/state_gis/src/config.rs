use serde::Deserialize;
use utility_lookup_models::UtilityType;

/// One entry of the state GIS endpoint registry, keyed on `(state,
/// utility_type)` in the embedded table.
#[derive(Debug, Clone, Deserialize)]
pub struct StateEndpoint {
    pub state: String,
    pub utility_type: UtilityType,
    #[serde(flatten)]
    pub config: EndpointConfig,
}

/// Tagged per-endpoint configuration, mirroring the original
/// implementation's four dispatch shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndpointConfig {
    /// A single named provider serves the entire state (e.g., a state-run
    /// public power authority).
    SingleUtility { name: String },

    /// Region lookup by lat/lon bounding box, for places an `ArcGIS`
    /// layer can't usefully cover (e.g. the Hawaiian islands, each served
    /// by a different utility).
    CoordinateMapping { regions: Vec<CoordinateRegion> },

    /// A list of layer URLs tried in order; first hit wins. Used where a
    /// state publishes per-utility-type layers separately rather than one
    /// combined feature service.
    MultiLayer {
        layers: Vec<String>,
        name_field: String,
    },

    /// A standard `ArcGIS` REST feature service query.
    Arcgis {
        url: String,
        name_field: String,
        #[serde(default)]
        filter_field: Option<String>,
        #[serde(default)]
        filter_value: Option<String>,
        #[serde(default)]
        fallback_url: Option<String>,
        #[serde(default)]
        out_fields: Option<Vec<String>>,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoordinateRegion {
    pub name: String,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl CoordinateRegion {
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// The full, embeddable endpoint registry.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointRegistry {
    endpoints: Vec<StateEndpoint>,
}

impl EndpointRegistry {
    /// Parses a registry from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Loads the registry embedded in this binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded table is malformed (validated at build
    /// time, like the teacher's `service_registry`).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json(include_str!("../data/state_gis_config.json"))
            .unwrap_or_else(|e| panic!("failed to parse embedded state GIS config: {e}"))
    }

    #[must_use]
    pub fn lookup(&self, state: &str, utility_type: UtilityType) -> Option<&EndpointConfig> {
        self.endpoints
            .iter()
            .find(|e| e.state.eq_ignore_ascii_case(state) && e.utility_type == utility_type)
            .map(|e| &e.config)
    }

    #[must_use]
    pub fn has_state_source(&self, state: &str, utility_type: UtilityType) -> bool {
        self.lookup(state, utility_type).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_registry_loads() {
        let registry = EndpointRegistry::embedded();
        assert!(!registry.endpoints.is_empty());
    }

    #[test]
    fn hawaii_is_coordinate_mapping() {
        let registry = EndpointRegistry::embedded();
        let config = registry
            .lookup("HI", UtilityType::Electric)
            .expect("Hawaii electric endpoint must be configured");
        assert!(matches!(config, EndpointConfig::CoordinateMapping { .. }));
    }

    #[test]
    fn unknown_state_returns_none() {
        let registry = EndpointRegistry::embedded();
        assert!(registry.lookup("ZZ", UtilityType::Electric).is_none());
    }
}
