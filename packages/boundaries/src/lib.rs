#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HIFLD utility territory boundary ingestion.
//!
//! Downloads electric, gas, and water territory polygons from HIFLD's
//! `ArcGIS` `FeatureServer` endpoints and loads them into
//! `utility_lookup_database::territories_db` as a full refresh (HIFLD
//! publishes a complete snapshot each cycle, so there is no incremental
//! update path).

pub mod ingest;

use thiserror::Error;

/// Errors that can occur during boundary ingestion.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] utility_lookup_database::DbError),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
