#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared data types for the utility provider resolution engine.
//!
//! Every component (normalizer, spatial index, state GIS client, tabular
//! adapters, scorer, ID matcher, pipeline, cache, validator) exchanges the
//! types defined here rather than ad-hoc tuples or maps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The utility service types this engine resolves providers for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UtilityType {
    Electric,
    Gas,
    Water,
    Sewer,
    Trash,
    Internet,
}

impl UtilityType {
    /// The catalog's `UtilityTypeId` encoding (fixed, from the provider catalog CSV).
    #[must_use]
    pub const fn catalog_type_id(self) -> &'static str {
        match self {
            Self::Electric => "2",
            Self::Water => "3",
            Self::Gas => "4",
            Self::Trash => "5",
            Self::Sewer => "6",
            Self::Internet => "8",
        }
    }
}

/// How a candidate's name was resolved to a canonical provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchMethod {
    TenantVerified,
    EiaId,
    Exact,
    Fuzzy,
    Substring,
    Passthrough,
    None,
}

/// An address resolved to coordinates by an external geocoder.
///
/// `block_geoid` is the 15-character Census block identifier consulted by
/// the internet (FCC BDC) source; geocoders that cannot produce one leave
/// it `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodedAddress {
    pub lat: f64,
    pub lon: f64,
    pub confidence: f64,
    pub formatted_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub county: Option<String>,
    pub block_geoid: Option<String>,
}

/// A utility territory polygon: one row of the electric, gas, or water
/// spatial table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerritoryPolygon {
    pub name: String,
    pub state: String,
    /// e.g. `"INVESTOR OWNED"`, `"COOPERATIVE"`, `"MUNICIPAL"`, `"POLITICAL"`.
    pub shape_type: String,
    pub area_km2: f64,
    pub customers: Option<u64>,
    pub eia_id: Option<u32>,
    pub control_area: Option<String>,
    pub pwsid: Option<String>,
    pub holding_company: Option<String>,
    /// Source tag propagated onto the candidate built from this polygon.
    pub source: String,
}

/// A pipeline-internal candidate before deduplication and arbitration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProvider {
    pub raw_name: String,
    pub canonical_id: Option<String>,
    pub display_name: String,
    pub eia_id: Option<u32>,
    pub utility_type: UtilityType,
    pub confidence: f64,
    pub match_method: MatchMethod,
    pub polygon_source: String,
    pub state: String,
    pub is_deregulated: bool,
    pub deregulated_note: Option<String>,
}

/// A demoted candidate surfaced alongside the primary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub provider: String,
    pub confidence: f64,
    pub source: String,
    pub eia_id: Option<u32>,
    pub catalog_id: Option<i32>,
    pub catalog_title: Option<String>,
}

/// The pipeline's per-utility-type output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResult {
    pub provider_name: String,
    pub canonical_id: Option<String>,
    pub eia_id: Option<u32>,
    pub utility_type: UtilityType,
    pub confidence: f64,
    pub match_method: MatchMethod,
    pub is_deregulated: bool,
    pub deregulated_note: Option<String>,
    pub polygon_source: String,
    pub needs_review: bool,
    pub alternatives: Vec<Alternative>,
    pub catalog_id: Option<i32>,
    pub catalog_title: Option<String>,
    pub id_match_score: u32,
    pub id_confident: bool,
    pub phone: Option<String>,
    pub website: Option<String>,
}

impl ProviderResult {
    /// `needs_review` is an invariant of confidence, not an independent flag.
    #[must_use]
    pub fn recompute_needs_review(mut self) -> Self {
        self.needs_review = self.confidence < 0.70;
        self
    }
}

/// The full per-address lookup result, serialized verbatim by the HTTP API
/// and the result cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub geocode_confidence: f64,
    pub electric: Option<ProviderResult>,
    pub gas: Option<ProviderResult>,
    pub water: Option<ProviderResult>,
    pub sewer: Option<ProviderResult>,
    pub trash: Option<ProviderResult>,
    pub internet: Option<serde_json::Value>,
    pub lookup_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl LookupResult {
    /// A result for an address the geocoder could not resolve: lat/lon are
    /// zero and every provider field is `None`. Never cached (see C8).
    #[must_use]
    pub fn unresolved(address: String, lookup_time_ms: u64) -> Self {
        Self {
            address,
            lat: 0.0,
            lon: 0.0,
            geocode_confidence: 0.0,
            electric: None,
            gas: None,
            water: None,
            sewer: None,
            trash: None,
            internet: None,
            lookup_time_ms,
            timestamp: Utc::now(),
        }
    }
}

/// A user-entered correction, authoritative over every other source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correction {
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub zip: Option<String>,
    pub state: String,
    pub utility_type: UtilityType,
    pub corrected_provider: String,
    pub corrected_catalog_id: Option<i32>,
    pub original_provider: Option<String>,
    pub corrected_by: String,
    pub corrected_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// A catalog-ID correction: maps one engine-produced display name straight
/// to a catalog row, bypassing fuzzy matching entirely (see C6 step 2).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdMappingCorrection {
    pub engine_provider_name: String,
    pub utility_type: UtilityType,
    pub correct_catalog_id: i32,
}

/// Per-(state, utility_type) circuit breaker bookkeeping for the State GIS
/// client. Process-local; never persisted.
#[derive(Debug, Clone, Default)]
pub struct CircuitBreakerState {
    pub consecutive_failures: u32,
    pub disabled_until: Option<DateTime<Utc>>,
}

/// A resolved catalog match, returned by the Provider-ID Matcher (C6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMatch {
    pub id: i32,
    pub title: String,
    pub url: Option<String>,
    pub phone: Option<String>,
    pub match_score: u32,
    pub match_method: String,
    pub confident: bool,
}
