#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result cache policy (C8): sits on top of
//! [`utility_lookup_database::result_cache`]'s mechanism and adds the
//! address normalization, default TTL, and never-cache-a-failure rule a
//! production cache needs.

use duckdb::Connection;
use utility_lookup_database::DbError;
use utility_lookup_models::LookupResult;

/// Default time a cached result stays valid. Boundary and canonical tables
/// refresh far less often than this, so 90 days trades a little staleness
/// for a much higher hit rate.
pub const DEFAULT_TTL_HOURS: i64 = 24 * 90;

const ABBREVIATIONS: &[(&str, &str)] = &[
    ("street", "st"),
    ("avenue", "ave"),
    ("boulevard", "blvd"),
    ("drive", "dr"),
    ("lane", "ln"),
    ("road", "rd"),
    ("court", "ct"),
    ("circle", "cir"),
    ("place", "pl"),
    ("parkway", "pkwy"),
    ("highway", "hwy"),
    ("north", "n"),
    ("south", "s"),
    ("east", "e"),
    ("west", "w"),
    ("northeast", "ne"),
    ("northwest", "nw"),
    ("southeast", "se"),
    ("southwest", "sw"),
    ("apartment", "apt"),
    ("suite", "ste"),
    ("building", "bldg"),
    ("floor", "fl"),
];

/// Normalizes an address for cache-key purposes: lowercase, whitespace-
/// collapsed, and common street-suffix/direction words standardized to
/// their abbreviation. This is richer than
/// [`utility_lookup_database::result_cache::address_key`], which only
/// lowercases and collapses whitespace; the extra normalization here
/// catches "123 Main Street" vs "123 Main St" as the same key before it
/// ever reaches that lower layer.
#[must_use]
pub fn normalize_address(address: &str) -> String {
    address
        .trim()
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            let trimmed = word.trim_end_matches(',');
            let replacement = ABBREVIATIONS.iter().find(|(full, _)| *full == trimmed).map(|(_, abbr)| *abbr);
            replacement.unwrap_or(trimmed).to_string()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Policy wrapper over the raw result cache table.
pub struct ResultCache {
    ttl_hours: i64,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_HOURS)
    }
}

impl ResultCache {
    #[must_use]
    pub const fn new(ttl_hours: i64) -> Self {
        Self { ttl_hours }
    }

    /// Looks up a cached result for `address`, honoring this cache's TTL.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the underlying query fails.
    pub fn get(&self, conn: &Connection, address: &str) -> Result<Option<LookupResult>, DbError> {
        let normalized = normalize_address(address);
        utility_lookup_database::result_cache::lookup(conn, &normalized, self.ttl_hours)
    }

    /// Caches `result`, unless it represents a geocode failure
    /// (`lat == 0.0 && lon == 0.0`). Caching a failure would mean a
    /// transient geocoder outage poisons the cache for the next 90 days.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the underlying insert fails.
    pub fn put(&self, conn: &Connection, address: &str, result: &LookupResult) -> Result<(), DbError> {
        if result.lat == 0.0 && result.lon == 0.0 {
            return Ok(());
        }
        let normalized = normalize_address(address);
        utility_lookup_database::result_cache::store(conn, &normalized, result)
    }

    /// Removes any cached entry for `address`. Used when an operator
    /// enters a correction for an address already in the cache.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the underlying delete fails.
    pub fn invalidate(&self, conn: &Connection, address: &str) -> Result<(), DbError> {
        let normalized = normalize_address(address);
        utility_lookup_database::result_cache::delete(conn, &normalized)
    }

    /// Deletes every entry older than this cache's TTL, returning the
    /// number removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the underlying delete fails.
    pub fn clear_expired(&self, conn: &Connection) -> Result<u64, DbError> {
        utility_lookup_database::result_cache::clear_expired(conn, self.ttl_hours)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample_result(lat: f64, lon: f64) -> LookupResult {
        LookupResult {
            address: "123 Main Street".to_string(),
            lat,
            lon,
            geocode_confidence: 0.9,
            electric: None,
            gas: None,
            water: None,
            sewer: None,
            trash: None,
            internet: None,
            lookup_time_ms: 10,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn normalizes_street_suffix_abbreviations() {
        assert_eq!(normalize_address("123 Main Street"), "123 main st");
        assert_eq!(normalize_address("123 MAIN ST"), "123 main st");
        assert_eq!(normalize_address("456 North Oak Avenue"), "456 n oak ave");
    }

    #[test]
    fn strips_trailing_comma_before_matching_abbreviation() {
        assert_eq!(normalize_address("1 State Street, Chicago"), "1 state st, chicago");
    }

    #[test]
    fn street_and_st_variants_hit_the_same_key() {
        assert_eq!(normalize_address("789 Elm Street"), normalize_address("789 Elm St"));
    }

    #[test]
    fn never_caches_a_geocode_failure() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE result_cache (
                address_key TEXT PRIMARY KEY,
                result_json TEXT NOT NULL,
                cached_at TIMESTAMPTZ NOT NULL
            );",
        )
        .unwrap();

        let cache = ResultCache::new(DEFAULT_TTL_HOURS);
        let failure = sample_result(0.0, 0.0);
        cache.put(&conn, "123 Main Street", &failure).unwrap();

        assert!(cache.get(&conn, "123 Main Street").unwrap().is_none());
    }

    #[test]
    fn caches_a_real_result_and_round_trips_through_normalization() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE result_cache (
                address_key TEXT PRIMARY KEY,
                result_json TEXT NOT NULL,
                cached_at TIMESTAMPTZ NOT NULL
            );",
        )
        .unwrap();

        let cache = ResultCache::new(DEFAULT_TTL_HOURS);
        let result = sample_result(41.8, -87.6);
        cache.put(&conn, "123 Main Street", &result).unwrap();

        let fetched = cache.get(&conn, "123 MAIN ST").unwrap().unwrap();
        assert!((fetched.lat - 41.8).abs() < f64::EPSILON);
    }

    #[test]
    fn invalidate_removes_the_entry() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE result_cache (
                address_key TEXT PRIMARY KEY,
                result_json TEXT NOT NULL,
                cached_at TIMESTAMPTZ NOT NULL
            );",
        )
        .unwrap();

        let cache = ResultCache::new(DEFAULT_TTL_HOURS);
        let result = sample_result(41.8, -87.6);
        cache.put(&conn, "123 Main Street", &result).unwrap();
        cache.invalidate(&conn, "123 Main Street").unwrap();

        assert!(cache.get(&conn, "123 Main Street").unwrap().is_none());
    }
}
