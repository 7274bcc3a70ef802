#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the `DuckDB` data directory.
//!
//! All paths are relative to the project root's `data/` directory.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the `data/shared/` directory for shared databases.
#[must_use]
pub fn shared_dir() -> PathBuf {
    data_dir().join("shared")
}

/// Returns the path for the territory polygons `DuckDB` file (electric,
/// gas, and water territories consulted by the spatial index).
#[must_use]
pub fn territories_db_path() -> PathBuf {
    shared_dir().join("territories.duckdb")
}

/// Returns the path for the geocode cache `DuckDB` file.
#[must_use]
pub fn geocode_cache_db_path() -> PathBuf {
    shared_dir().join("geocode_cache.duckdb")
}

/// Returns the path for the result cache `DuckDB` file (C8).
#[must_use]
pub fn result_cache_db_path() -> PathBuf {
    shared_dir().join("result_cache.duckdb")
}

/// Returns the path for the corrections `DuckDB` file (address/ZIP
/// corrections and catalog ID mapping overrides, both operator-entered).
#[must_use]
pub fn corrections_db_path() -> PathBuf {
    shared_dir().join("corrections.duckdb")
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
