#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `DuckDB`-backed storage for the utility provider resolution engine.
//!
//! Three independent databases, each a single `DuckDB` file under
//! `data/shared/`: territory polygons (read by `utility_lookup_spatial`),
//! the per-address result cache (C8), and operator-entered corrections
//! (address/ZIP corrections plus catalog ID mapping overrides, read by
//! `utility_lookup_adapters` and `utility_lookup_id_matcher` at startup).

pub mod corrections_db;
pub mod error;
pub mod geocode_cache;
pub mod paths;
pub mod result_cache;
pub mod territories_db;

pub use error::DbError;
