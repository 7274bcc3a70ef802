#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! API request and response types for the utility lookup server.
//!
//! These types are serialized to JSON for the REST API, kept separate
//! from [`utility_lookup_models`] so the wire contract can evolve
//! independently of the engine's internal result shape.

use serde::{Deserialize, Serialize};
use utility_lookup_models::LookupResult;

/// Maximum number of addresses accepted by a single `/lookup/batch` call.
pub const MAX_BATCH_SIZE: usize = 100;

/// `GET /health` response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `"ok"` once the engine has finished loading, `"loading"` until then.
    pub status: String,
    pub engine_loaded: bool,
    pub uptime_seconds: u64,
}

/// Query parameters accepted by `GET`/`POST /lookup`.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupQuery {
    pub address: String,
    #[serde(default)]
    pub no_cache: bool,
    pub api_key: Option<String>,
}

/// Request body for `POST /lookup/batch`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchLookupRequest {
    pub addresses: Vec<String>,
}

/// One address's outcome within a batch response. Exactly one of
/// `result`/`error` is set; a per-address failure never fails the batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchAddressResult {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<LookupResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `POST /lookup/batch` response.
#[derive(Debug, Clone, Serialize)]
pub struct BatchLookupResponse {
    pub results: Vec<BatchAddressResult>,
    pub total: usize,
    pub lookup_time_ms: u64,
}

/// `DELETE /cache` response.
#[derive(Debug, Clone, Serialize)]
pub struct CacheClearedResponse {
    pub cleared: u64,
}

/// Uniform error body for non-2xx responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
