#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! FCC BDC (Broadband Data Collection) internet provider lookup,
//! keyed by Census block `GeoID`.
//!
//! Backed by a Postgres table the rest of this workspace doesn't
//! otherwise need, so this lives as its own crate rather than folding
//! into `utility_lookup_adapters` — those are narrow, pure lookups
//! over a table loaded once at startup, not a live, optional database
//! connection. [`InternetClient`] connects lazily from `DATABASE_URL`
//! and degrades to `None` for every lookup when the variable is unset
//! or the database is unreachable, rather than failing the request
//! the internet source can't answer.

mod error;
mod summary;

pub use error::InternetError;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const ENV_VAR: &str = "DATABASE_URL";

/// Queries the `internet_providers` table for a Census block's
/// available ISPs.
pub struct InternetClient {
    pool: Option<PgPool>,
}

impl InternetClient {
    /// Builds a client from `DATABASE_URL`. Connection is established
    /// lazily (the pool opens its first connection on the first
    /// query) so this never blocks or fails engine startup; a bad
    /// connection string is logged and treated the same as an unset
    /// variable.
    #[must_use]
    pub fn connect_from_env() -> Self {
        let Ok(url) = std::env::var(ENV_VAR) else {
            log::info!("{ENV_VAR} not set; internet source disabled");
            return Self { pool: None };
        };

        match PgPoolOptions::new().max_connections(5).connect_lazy(&url) {
            Ok(pool) => {
                log::info!("internet source configured (lazy Postgres pool)");
                Self { pool: Some(pool) }
            }
            Err(e) => {
                log::warn!("internet source disabled: {}", InternetError::Connect(e));
                Self { pool: None }
            }
        }
    }

    /// Builds a client with no backing database. Every lookup
    /// returns `None`.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { pool: None }
    }

    /// Looks up internet providers for a Census block `GeoID`.
    ///
    /// Returns `None` if `block_geoid` is empty, no database is
    /// configured, the block has no rows, or the query fails. A query
    /// failure is logged at `debug` and otherwise swallowed, the same
    /// suspension-point behavior the rest of the engine's optional
    /// sources use.
    pub async fn lookup(&self, block_geoid: &str) -> Option<serde_json::Value> {
        if block_geoid.is_empty() {
            return None;
        }
        let pool = self.pool.as_ref()?;

        let row = sqlx::query_scalar::<_, serde_json::Value>("SELECT providers FROM internet_providers WHERE block_geoid = $1")
            .bind(block_geoid)
            .fetch_optional(pool)
            .await;

        match row {
            Ok(Some(providers)) => {
                let raw = as_provider_array(&providers);
                Some(summary::build_summary(&raw))
            }
            Ok(None) => None,
            Err(e) => {
                log::debug!("internet lookup error for {block_geoid}: {}", InternetError::Query(e));
                None
            }
        }
    }
}

/// The `providers` column is a JSONB array in the common case, but
/// tolerate a single bare object too (mirrors the defensive unwrap the
/// original ingestion needed for one malformed batch of rows).
fn as_provider_array(value: &serde_json::Value) -> Vec<serde_json::Value> {
    match value {
        serde_json::Value::Array(items) => items.clone(),
        serde_json::Value::Object(_) => vec![value.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_client_never_looks_up() {
        let client = InternetClient::disabled();
        assert!(client.lookup("170318392001000").await.is_none());
    }

    #[tokio::test]
    async fn empty_block_geoid_short_circuits_without_querying() {
        let client = InternetClient::disabled();
        assert!(client.lookup("").await.is_none());
    }

    #[test]
    fn as_provider_array_wraps_a_bare_object() {
        let obj = serde_json::json!({"name": "SoloCo", "tech": "50"});
        let arr = as_provider_array(&obj);
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["name"], "SoloCo");
    }

    #[test]
    fn as_provider_array_passes_through_an_array() {
        let arr = serde_json::json!([{"name": "A"}, {"name": "B"}]);
        assert_eq!(as_provider_array(&arr).len(), 2);
    }
}
