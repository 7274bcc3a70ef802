//! Geocoding result cache stored in `DuckDB`.
//!
//! Shared across all sources. Caches both successful geocodes
//! (with coordinates and the resolved city/state/zip/county/block
//! `GeoID`) and failed lookups (null coordinates) so we don't
//! re-query the same addresses. Every component is persisted, not
//! just the coordinates: the city/state/zip/county-keyed adapters and
//! the internet source all need them on a cache hit too, or a cached
//! lookup silently resolves worse than a cold one.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use duckdb::Connection;

use crate::DbError;

/// A cached geocoding result: `(address_key, provider, lat, lng,
/// matched_address, city, state, zip, county, block_geoid)`.
pub type CacheEntry = (String, String, Option<f64>, Option<f64>, Option<String>, Option<String>, Option<String>, Option<String>, Option<String>, Option<String>);

/// A provider result row: `(address_key, lat, lng, matched_address)`.
pub type ProviderResult = (String, Option<f64>, Option<f64>, Option<String>);

/// The full set of components recovered for one address on a cache
/// hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedGeocode {
    pub lat: f64,
    pub lon: f64,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub county: Option<String>,
    pub block_geoid: Option<String>,
}

/// Opens (or creates) the geocode cache `DuckDB`.
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

/// Opens the geocode cache at the default path.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open_default() -> Result<Connection, DbError> {
    open(&crate::paths::geocode_cache_db_path())
}

fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS geocode_cache (
            address_key TEXT NOT NULL,
            provider TEXT NOT NULL,
            lat DOUBLE,
            lng DOUBLE,
            matched_address TEXT,
            city TEXT,
            state TEXT,
            zip TEXT,
            county TEXT,
            block_geoid TEXT,
            created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (address_key, provider)
        );
        ALTER TABLE geocode_cache ADD COLUMN IF NOT EXISTS city TEXT;
        ALTER TABLE geocode_cache ADD COLUMN IF NOT EXISTS state TEXT;
        ALTER TABLE geocode_cache ADD COLUMN IF NOT EXISTS zip TEXT;
        ALTER TABLE geocode_cache ADD COLUMN IF NOT EXISTS county TEXT;
        ALTER TABLE geocode_cache ADD COLUMN IF NOT EXISTS block_geoid TEXT;",
    )?;
    Ok(())
}

/// Result of a geocode cache lookup: `(hits, tried_keys)`.
pub type CacheLookupResult = (BTreeMap<String, CachedGeocode>, BTreeSet<String>);

/// Looks up cached geocoding results for the given address keys.
///
/// Returns `(hits, tried)` where:
/// - `hits` maps `address_key` -> the full recovered [`CachedGeocode`] for successful geocodes
/// - `tried` contains all `address_keys` that have any cache entry (hit or miss)
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn cache_lookup(
    conn: &Connection,
    address_keys: &[String],
) -> Result<CacheLookupResult, DbError> {
    let mut hits: BTreeMap<String, CachedGeocode> = BTreeMap::new();
    let mut tried: BTreeSet<String> = BTreeSet::new();

    if address_keys.is_empty() {
        return Ok((hits, tried));
    }

    for chunk in address_keys.chunks(1000) {
        let placeholders: String = chunk.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "SELECT address_key, lat, lng, city, state, zip, county, block_geoid
             FROM geocode_cache WHERE address_key IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;

        for (i, key) in chunk.iter().enumerate() {
            stmt.raw_bind_parameter(i + 1, key)?;
        }

        stmt.raw_execute()?;
        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let lat: Option<f64> = row.get(1)?;
            let lng: Option<f64> = row.get(2)?;
            let city: Option<String> = row.get(3)?;
            let state: Option<String> = row.get(4)?;
            let zip: Option<String> = row.get(5)?;
            let county: Option<String> = row.get(6)?;
            let block_geoid: Option<String> = row.get(7)?;

            tried.insert(key.clone());

            if let (Some(lat_v), Some(lng_v)) = (lat, lng) {
                hits.insert(
                    key,
                    CachedGeocode {
                        lat: lat_v,
                        lon: lng_v,
                        city,
                        state,
                        zip,
                        county,
                        block_geoid,
                    },
                );
            }
        }
    }

    Ok((hits, tried))
}

/// Inserts geocoding results (both hits and misses) into the cache.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails.
pub fn cache_insert(conn: &Connection, entries: &[CacheEntry]) -> Result<(), DbError> {
    if entries.is_empty() {
        return Ok(());
    }

    // DO UPDATE, not DO NOTHING: a row cached before city/state/zip/
    // county/block_geoid were tracked would otherwise never pick up
    // those components, forcing a network re-geocode on every lookup
    // of that address forever.
    let mut stmt = conn.prepare(
        "INSERT INTO geocode_cache (address_key, provider, lat, lng, matched_address, city, state, zip, county, block_geoid)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT (address_key, provider) DO UPDATE SET
            lat = excluded.lat,
            lng = excluded.lng,
            matched_address = excluded.matched_address,
            city = excluded.city,
            state = excluded.state,
            zip = excluded.zip,
            county = excluded.county,
            block_geoid = excluded.block_geoid",
    )?;

    for (key, provider, lat, lng, matched, city, state, zip, county, block_geoid) in entries {
        stmt.execute(duckdb::params![
            key,
            provider,
            lat,
            lng,
            matched.as_deref(),
            city.as_deref(),
            state.as_deref(),
            zip.as_deref(),
            county.as_deref(),
            block_geoid.as_deref(),
        ])?;
    }

    Ok(())
}

/// Retrieves all cached results for a specific provider.
///
/// Returns a list of `(address_key, lat, lng, matched_address)` tuples.
/// If `limit` is `Some`, returns at most that many rows.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn get_by_provider(
    conn: &Connection,
    provider: &str,
    limit: Option<u64>,
) -> Result<Vec<ProviderResult>, DbError> {
    let sql = limit.map_or_else(
        || {
            "SELECT address_key, lat, lng, matched_address
             FROM geocode_cache
             WHERE provider = ?"
                .to_string()
        },
        |n| {
            format!(
                "SELECT address_key, lat, lng, matched_address
                 FROM geocode_cache
                 WHERE provider = ?
                 LIMIT {n}"
            )
        },
    );

    let mut stmt = conn.prepare(&sql)?;
    stmt.raw_bind_parameter(1, provider)?;
    stmt.raw_execute()?;

    let mut results = Vec::new();
    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let key: String = row.get(0)?;
        let lat: Option<f64> = row.get(1)?;
        let lng: Option<f64> = row.get(2)?;
        let matched: Option<String> = row.get(3)?;
        results.push((key, lat, lng, matched));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_entry(key: &str) -> CacheEntry {
        (
            key.to_string(),
            "census".to_string(),
            Some(41.8),
            Some(-87.6),
            Some("100 MAIN ST, CHICAGO, IL, 60601".to_string()),
            Some("Chicago".to_string()),
            Some("IL".to_string()),
            Some("60601".to_string()),
            Some("Cook".to_string()),
            Some("170318392001000".to_string()),
        )
    }

    #[test]
    fn cache_hit_rehydrates_every_component() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        cache_insert(&conn, &[full_entry("100 main st")]).unwrap();

        let (hits, tried) = cache_lookup(&conn, &["100 main st".to_string()]).unwrap();
        assert!(tried.contains("100 main st"));
        let hit = hits.get("100 main st").unwrap();
        assert!((hit.lat - 41.8).abs() < f64::EPSILON);
        assert_eq!(hit.city.as_deref(), Some("Chicago"));
        assert_eq!(hit.state.as_deref(), Some("IL"));
        assert_eq!(hit.zip.as_deref(), Some("60601"));
        assert_eq!(hit.county.as_deref(), Some("Cook"));
        assert_eq!(hit.block_geoid.as_deref(), Some("170318392001000"));
    }

    #[test]
    fn reinserting_the_same_key_upgrades_a_legacy_coordinates_only_row() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();

        let legacy = ("100 main st".to_string(), "census".to_string(), Some(41.8), Some(-87.6), None, None, None, None, None, None);
        cache_insert(&conn, &[legacy]).unwrap();

        let (hits, _) = cache_lookup(&conn, &["100 main st".to_string()]).unwrap();
        assert!(hits.get("100 main st").unwrap().state.is_none());

        cache_insert(&conn, &[full_entry("100 main st")]).unwrap();

        let (hits, _) = cache_lookup(&conn, &["100 main st".to_string()]).unwrap();
        assert_eq!(hits.get("100 main st").unwrap().state.as_deref(), Some("IL"));
    }

    #[test]
    fn miss_is_not_a_hit_but_is_tried() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        let miss = ("nowhere".to_string(), "census".to_string(), None, None, None, None, None, None, None, None);
        cache_insert(&conn, &[miss]).unwrap();

        let (hits, tried) = cache_lookup(&conn, &["nowhere".to_string()]).unwrap();
        assert!(!hits.contains_key("nowhere"));
        assert!(tried.contains("nowhere"));
    }
}
