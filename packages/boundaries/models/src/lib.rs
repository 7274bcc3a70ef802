#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! US state FIPS code tables and the row type HIFLD territory ingestion
//! maps `ArcGIS` feature attributes onto before a full-refresh load into
//! `utility_lookup_database::territories_db`.

pub mod fips;

use serde::{Deserialize, Serialize};

/// One HIFLD feature, flattened from `ArcGIS` attributes into the columns
/// `territories_db::TerritoryRow` stores. Produced by ingestion, consumed by
/// [`utility_lookup_database::territories_db::replace_all`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTerritoryFeature {
    pub name: String,
    pub state: String,
    pub shape_type: String,
    pub area_km2: Option<f64>,
    pub customers: Option<i64>,
    pub eia_id: Option<i64>,
    pub control_area: Option<String>,
    pub pwsid: Option<String>,
    pub holding_company: Option<String>,
    pub geojson: String,
}
