use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;
use utility_lookup_models::UtilityType;

use crate::config::{EndpointConfig, EndpointRegistry};
use crate::error::StateGisError;

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// A successful state GIS match.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub name: String,
    pub source: String,
    pub confidence: f64,
    pub state: String,
}

type CacheKey = (i64, i64, String, UtilityType);

/// Queries state-specific `ArcGIS` REST endpoints for authoritative
/// territory data, with a per-result cache and a circuit breaker guarding
/// every `(state, utility_type)` endpoint.
pub struct StateGisClient {
    registry: EndpointRegistry,
    http: reqwest::Client,
    breaker: crate::circuit_breaker::CircuitBreaker,
    cache: Mutex<HashMap<CacheKey, Option<QueryResult>>>,
}

impl StateGisClient {
    #[must_use]
    pub fn new(registry: EndpointRegistry) -> Self {
        Self {
            registry,
            http: reqwest::Client::new(),
            breaker: crate::circuit_breaker::CircuitBreaker::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_embedded_registry() -> Self {
        Self::new(EndpointRegistry::embedded())
    }

    #[must_use]
    pub fn has_state_source(&self, state: &str, utility_type: UtilityType) -> bool {
        self.registry.has_state_source(state, utility_type)
    }

    pub fn reset_circuit_breakers(&self) {
        self.breaker.reset_all();
    }

    /// Queries the configured endpoint for `(state, utility_type)` at the
    /// given coordinates.
    ///
    /// Never returns an error to the caller: network failures, timeouts,
    /// and parse errors are logged, recorded against the circuit breaker,
    /// and degrade to `None`, matching every other pipeline source.
    pub async fn query(
        &self,
        lat: f64,
        lon: f64,
        state: &str,
        utility_type: UtilityType,
    ) -> Option<QueryResult> {
        let cache_key = (round3(lat), round3(lon), state.to_string(), utility_type);

        if let Some(cached) = self
            .cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&cache_key)
        {
            return cached.clone();
        }

        if self.breaker.is_open(state, utility_type) {
            log::debug!("state GIS breaker open for {state}/{utility_type}, skipping");
            return None;
        }

        let Some(config) = self.registry.lookup(state, utility_type) else {
            return None;
        };

        let result = match self.dispatch(config, lat, lon, state).await {
            Ok(hit) => {
                self.breaker.record_success(state, utility_type);
                hit
            }
            Err(err) => {
                log::warn!("state GIS query failed for {state}/{utility_type}: {err}");
                self.breaker.record_failure(state, utility_type);
                None
            }
        };

        self.cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(cache_key, result.clone());

        result
    }

    async fn dispatch(
        &self,
        config: &EndpointConfig,
        lat: f64,
        lon: f64,
        state: &str,
    ) -> Result<Option<QueryResult>, StateGisError> {
        match config {
            EndpointConfig::SingleUtility { name } => Ok(Some(QueryResult {
                name: name.clone(),
                source: "single_utility".to_string(),
                confidence: 0.85,
                state: state.to_string(),
            })),
            EndpointConfig::CoordinateMapping { regions } => Ok(regions
                .iter()
                .find(|region| region.contains(lat, lon))
                .map(|region| QueryResult {
                    name: region.name.clone(),
                    source: "coordinate_mapping".to_string(),
                    confidence: 0.90,
                    state: state.to_string(),
                })),
            EndpointConfig::MultiLayer { layers, name_field } => {
                for url in layers {
                    let hit = self
                        .query_arcgis(url, name_field, None, None, None, None, lat, lon, state)
                        .await?;
                    if hit.is_some() {
                        return Ok(hit);
                    }
                }
                Ok(None)
            }
            EndpointConfig::Arcgis {
                url,
                name_field,
                filter_field,
                filter_value,
                fallback_url,
                out_fields,
                timeout_secs,
            } => {
                let primary = self
                    .query_arcgis(
                        url,
                        name_field,
                        filter_field.as_deref(),
                        filter_value.as_deref(),
                        out_fields.as_deref(),
                        *timeout_secs,
                        lat,
                        lon,
                        state,
                    )
                    .await?;
                if primary.is_some() {
                    return Ok(primary);
                }
                if let Some(fallback_url) = fallback_url {
                    return self
                        .query_arcgis(
                            fallback_url,
                            name_field,
                            filter_field.as_deref(),
                            filter_value.as_deref(),
                            out_fields.as_deref(),
                            *timeout_secs,
                            lat,
                            lon,
                            state,
                        )
                        .await;
                }
                Ok(None)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn query_arcgis(
        &self,
        url: &str,
        name_field: &str,
        filter_field: Option<&str>,
        filter_value: Option<&str>,
        out_fields: Option<&[String]>,
        timeout_secs: Option<u64>,
        lat: f64,
        lon: f64,
        state: &str,
    ) -> Result<Option<QueryResult>, StateGisError> {
        let query_url = format!("{}/query", url.trim_end_matches('/'));
        let out_fields_param = out_fields.map_or_else(
            || name_field.to_string(),
            |fields| fields.join(","),
        );

        let mut params: Vec<(&str, String)> = vec![
            ("geometry", format!("{lon},{lat}")),
            ("geometryType", "esriGeometryPoint".to_string()),
            ("inSR", "4326".to_string()),
            ("spatialRel", "esriSpatialRelIntersects".to_string()),
            ("outFields", out_fields_param),
            ("returnGeometry", "false".to_string()),
            ("f", "json".to_string()),
        ];

        if let (Some(field), Some(value)) = (filter_field, filter_value) {
            params.push(("where", format!("{field} = '{value}'")));
        } else {
            params.push(("where", "1=1".to_string()));
        }

        let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let response = self
            .http
            .get(&query_url)
            .query(&params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    StateGisError::Timeout {
                        url: query_url.clone(),
                    }
                } else {
                    StateGisError::Http {
                        url: query_url.clone(),
                        source,
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(StateGisError::Status {
                url: query_url,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| StateGisError::Http {
            url: query_url.clone(),
            source,
        })?;

        let parsed: ArcGisFeatureResponse =
            serde_json::from_str(&body).map_err(|source| StateGisError::Parse {
                url: query_url.clone(),
                source,
            })?;

        let name = parsed.features.first().and_then(|feature| {
            feature
                .attributes
                .get(name_field)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        });

        Ok(name.map(|name| QueryResult {
            name,
            source: "arcgis".to_string(),
            confidence: 0.85,
            state: state.to_string(),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ArcGisFeatureResponse {
    #[serde(default)]
    features: Vec<ArcGisFeature>,
}

#[derive(Debug, Deserialize)]
struct ArcGisFeature {
    attributes: serde_json::Map<String, serde_json::Value>,
}

fn round3(value: f64) -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    let rounded = (value * 1000.0).round() as i64;
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn single_utility_always_returns_fixed_name() {
        let client = StateGisClient::with_embedded_registry();
        let result = client.query(33.75, -84.39, "GA", UtilityType::Electric).await;
        assert_eq!(result.unwrap().name, "Georgia Power");
    }

    #[tokio::test]
    async fn coordinate_mapping_resolves_hawaiian_islands() {
        let client = StateGisClient::with_embedded_registry();
        let result = client.query(21.3, -157.85, "HI", UtilityType::Electric).await;
        assert_eq!(result.unwrap().name, "Hawaiian Electric");
    }

    #[tokio::test]
    async fn coordinate_mapping_outside_all_regions_returns_none() {
        let client = StateGisClient::with_embedded_registry();
        let result = client.query(0.0, 0.0, "HI", UtilityType::Electric).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn missing_endpoint_returns_none_without_network_io() {
        let client = StateGisClient::with_embedded_registry();
        let result = client.query(40.0, -90.0, "ZZ", UtilityType::Electric).await;
        assert!(result.is_none());
    }

    #[test]
    fn round3_rounds_to_three_decimals() {
        assert_eq!(round3(32.714_063_262), 32714);
        assert_eq!(round3(-96.888_799_822), -96889);
    }
}
