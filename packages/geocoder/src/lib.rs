#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! US Census Bureau geocoding client.
//!
//! Converts a street address into `(lat, lon, state, zip, city, county,
//! block_geoid)` via the Census Bureau's free batch/single geocoder —
//! no API key required. [`census`] implements both entry points; this
//! module defines the input/output/error types and configuration shared
//! between them.
//!
//! Disk caching of results lives in
//! `utility_lookup_database::geocode_cache`, not here: this crate only
//! talks to the Census Bureau, it does not persist anything.

pub mod census;

use thiserror::Error;
use utility_lookup_models::GeocodedAddress;

/// Census Bureau geocoder endpoint configuration.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub benchmark: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://geocoding.geo.census.gov/geocoder".to_string(),
            benchmark: "Public_AR_Current".to_string(),
        }
    }
}

/// An address to be geocoded, with all available context.
#[derive(Debug, Clone)]
pub struct AddressInput {
    /// Unique identifier for correlating results back to the source record.
    pub id: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: Option<String>,
}

/// Whether a match was exact or approximate; informs the confidence the
/// pipeline assigns to [`GeocodedAddress::confidence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchQuality {
    Exact,
    Approximate,
}

impl MatchQuality {
    #[must_use]
    pub const fn confidence(self) -> f64 {
        match self {
            Self::Exact => 1.0,
            Self::Approximate => 0.75,
        }
    }
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("parse error: {message}")]
    Parse { message: String },
}

/// Result of a batch geocoding operation.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub matched: Vec<(String, GeocodedAddress)>,
    pub unmatched: Vec<String>,
}
