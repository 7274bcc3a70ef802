//! Persistent `LookupResult` cache in `DuckDB`, keyed by normalized
//! address. Rounds coordinates to a stable key so near-identical repeated
//! requests (whitespace/casing differences) hit the same row.

use std::path::Path;

use chrono::{DateTime, Utc};
use duckdb::Connection;
use utility_lookup_models::LookupResult;

use crate::DbError;

/// Opens (or creates) the result cache `DuckDB`.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    if let Some(parent) = path.parent() {
        crate::paths::ensure_dir(parent)?;
    }
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Opens the result cache at the default path.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open_default() -> Result<Connection, DbError> {
    open(&crate::paths::result_cache_db_path())
}

fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS result_cache (
            address_key TEXT PRIMARY KEY,
            result_json TEXT NOT NULL,
            cached_at TIMESTAMPTZ NOT NULL
        );",
    )?;
    Ok(())
}

/// Normalizes an address into the key `result_cache` is keyed by:
/// lowercase, whitespace-collapsed.
#[must_use]
pub fn address_key(address: &str) -> String {
    address.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Looks up a cached result, returning `None` on a miss or an entry older
/// than `ttl_hours`. An [`LookupResult::unresolved`] result (the geocoder
/// failed) is never written by [`store`], so a hit always has real
/// coordinates.
///
/// # Errors
///
/// Returns [`DbError`] if the query or JSON decoding fails.
pub fn lookup(
    conn: &Connection,
    address: &str,
    ttl_hours: i64,
) -> Result<Option<LookupResult>, DbError> {
    let key = address_key(address);
    let row: Option<(String, DateTime<Utc>)> = conn
        .query_row(
            "SELECT result_json, cached_at FROM result_cache WHERE address_key = ?",
            [&key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .ok();

    let Some((result_json, cached_at)) = row else {
        return Ok(None);
    };

    if Utc::now() - cached_at > chrono::Duration::hours(ttl_hours) {
        return Ok(None);
    }

    let result: LookupResult = serde_json::from_str(&result_json)
        .map_err(|e| DbError::Io(std::io::Error::other(e)))?;
    Ok(Some(result))
}

/// Caches a resolved result. Callers are responsible for never passing an
/// unresolved result (lat/lon both zero); this module does not special-
/// case that to keep the storage layer format-agnostic.
///
/// # Errors
///
/// Returns [`DbError`] if the insert or JSON encoding fails.
pub fn store(conn: &Connection, address: &str, result: &LookupResult) -> Result<(), DbError> {
    let key = address_key(address);
    let result_json =
        serde_json::to_string(result).map_err(|e| DbError::Io(std::io::Error::other(e)))?;

    conn.execute(
        "INSERT INTO result_cache (address_key, result_json, cached_at)
         VALUES (?, ?, ?)
         ON CONFLICT (address_key) DO UPDATE SET result_json = excluded.result_json, cached_at = excluded.cached_at",
        duckdb::params![key, result_json, Utc::now()],
    )?;
    Ok(())
}

/// Deletes every cached entry. Used by the `DELETE /cache` admin route
/// after a boundary or canonical-table refresh.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails.
pub fn clear(conn: &Connection) -> Result<u64, DbError> {
    let affected = conn.execute("DELETE FROM result_cache", [])?;
    Ok(affected as u64)
}

/// Deletes the cached entry for one address, if any. Used when an
/// operator enters a correction for an address already in the cache.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails.
pub fn delete(conn: &Connection, address: &str) -> Result<(), DbError> {
    let key = address_key(address);
    conn.execute("DELETE FROM result_cache WHERE address_key = ?", [&key])?;
    Ok(())
}

/// Deletes every entry older than `ttl_hours`, returning the number
/// removed.
///
/// # Errors
///
/// Returns [`DbError`] if the delete fails.
pub fn clear_expired(conn: &Connection, ttl_hours: i64) -> Result<u64, DbError> {
    let cutoff = Utc::now() - chrono::Duration::hours(ttl_hours);
    let affected = conn.execute("DELETE FROM result_cache WHERE cached_at < ?", duckdb::params![cutoff])?;
    Ok(affected as u64)
}
