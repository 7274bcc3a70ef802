//! HIFLD utility territory ingestion from `ArcGIS` `FeatureServer` endpoints.
//!
//! Downloads electric, gas, and water retail service territory polygons as
//! `GeoJSON` and loads them into `DuckDB` via
//! [`utility_lookup_database::territories_db::replace_all`].

use duckdb::Connection;
use utility_lookup_boundaries_models::RawTerritoryFeature;
use utility_lookup_database::territories_db::{self, TerritoryRow};

use crate::GeoError;

/// Page size for paginated requests. Kept low to avoid WAF blocks on large
/// geospatial responses.
const PAGE_SIZE: u32 = 100;

/// Maximum retry attempts per page request.
const MAX_RETRIES: u32 = 5;

/// Browser-like User-Agent to avoid WAF blocks on HIFLD's `ArcGIS` service.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; UtilityLookup/1.0; +https://github.com)";

/// Builds a `reqwest::Client` configured for HIFLD requests.
///
/// # Errors
///
/// Returns [`GeoError`] if the client cannot be built.
fn build_client() -> Result<reqwest::Client, GeoError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(Into::into)
}

/// Fetches all features from a HIFLD `ArcGIS` REST endpoint using paginated
/// requests (`resultOffset` + `resultRecordCount`).
///
/// `base_url` should contain every query parameter **except**
/// `resultOffset` and `resultRecordCount`; those are appended per page.
///
/// # Errors
///
/// Returns [`GeoError`] if all retry attempts are exhausted for any page.
async fn fetch_paginated(
    client: &reqwest::Client,
    base_url: &str,
    label: &str,
) -> Result<Vec<serde_json::Value>, GeoError> {
    let mut all_features: Vec<serde_json::Value> = Vec::new();
    let mut offset = 0u32;

    loop {
        let sep = if base_url.contains('?') { '&' } else { '?' };
        let url = format!("{base_url}{sep}resultRecordCount={PAGE_SIZE}&resultOffset={offset}");

        let json = fetch_page_with_retry(client, &url, label, offset, MAX_RETRIES).await?;

        let features = json["features"]
            .as_array()
            .ok_or_else(|| GeoError::Conversion {
                message: format!("No features array in HIFLD response for {label} (offset={offset})"),
            })?;

        if features.is_empty() {
            break;
        }

        #[allow(clippy::cast_possible_truncation)]
        let page_len = features.len() as u32;

        all_features.extend(features.iter().cloned());

        let exceeded = json
            .get("exceededTransferLimit")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        if !exceeded {
            break;
        }

        offset += page_len;
        log::info!(
            "{label}: fetched {page_len} features (total so far: {}), fetching next page...",
            all_features.len()
        );

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    Ok(all_features)
}

/// Truncates a string for logging, appending "..." if it exceeds `max_len`.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len])
    }
}

/// Fetches a single page with retry logic and exponential backoff. Logs the
/// raw response body on failure for debugging.
async fn fetch_page_with_retry(
    client: &reqwest::Client,
    url: &str,
    label: &str,
    offset: u32,
    max_retries: u32,
) -> Result<serde_json::Value, GeoError> {
    let mut last_error = String::new();

    for attempt in 0..max_retries {
        if attempt > 0 {
            let delay_secs = 1u64 << (attempt + 1);
            log::warn!(
                "{label} (offset={offset}): retry {attempt}/{max_retries} in {delay_secs}s..."
            );
            tokio::time::sleep(std::time::Duration::from_secs(delay_secs)).await;
        }

        let resp = match client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = format!("HTTP request error: {e}");
                log::warn!("{label} (offset={offset}, attempt {attempt}): {last_error}");
                continue;
            }
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) => {
                last_error = format!("Failed to read response body: {e}");
                log::warn!("{label} (offset={offset}, attempt {attempt}): {last_error}");
                continue;
            }
        };

        if !status.is_success() {
            last_error = format!("HTTP {status}");
            log::warn!(
                "{label} (offset={offset}, attempt {attempt}): {last_error}. Response body: {}",
                truncate_for_log(&body, 500)
            );
            continue;
        }

        let json: serde_json::Value = match serde_json::from_str(&body) {
            Ok(j) => j,
            Err(e) => {
                last_error = format!("JSON parse error: {e}");
                log::warn!(
                    "{label} (offset={offset}, attempt {attempt}): {last_error}. Response body: {}",
                    truncate_for_log(&body, 500)
                );
                continue;
            }
        };

        if let Some(error_obj) = json.get("error") {
            let code = error_obj
                .get("code")
                .and_then(serde_json::Value::as_i64)
                .unwrap_or(0);
            let msg = error_obj
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown");
            last_error = format!("ArcGIS error {code}: {msg}");
            log::warn!(
                "{label} (offset={offset}, attempt {attempt}): {last_error}. Full error: {error_obj}"
            );
            continue;
        }

        return Ok(json);
    }

    Err(GeoError::Conversion {
        message: format!(
            "HIFLD request failed after {max_retries} attempts for {label} (offset={offset}): {last_error}"
        ),
    })
}

/// One HIFLD layer to ingest: its query URL, the territories table it
/// refreshes, and the property names holding name/state/shape type in that
/// particular layer's schema (HIFLD layers are not schema-consistent across
/// electric/gas/water).
pub struct LayerSpec<'a> {
    pub query_url: &'a str,
    pub table: &'a str,
    pub name_field: &'a str,
    pub state_field: &'a str,
    pub shape_type_field: &'a str,
    pub area_field: Option<&'a str>,
    pub customers_field: Option<&'a str>,
    pub eia_id_field: Option<&'a str>,
    pub control_area_field: Option<&'a str>,
    pub pwsid_field: Option<&'a str>,
    pub holding_company_field: Option<&'a str>,
}

/// Downloads one HIFLD layer and replaces its territories table.
///
/// # Errors
///
/// Returns [`GeoError`] if the download or database write fails.
pub async fn ingest_layer(conn: &Connection, spec: &LayerSpec<'_>) -> Result<usize, GeoError> {
    let client = build_client()?;
    let features = fetch_paginated(&client, spec.query_url, spec.table).await?;

    let rows: Vec<TerritoryRow> = features
        .iter()
        .filter_map(|feature| feature_to_row(feature, spec))
        .map(raw_to_db_row)
        .collect();

    let count = rows.len();
    territories_db::replace_all(conn, spec.table, &rows)?;
    log::info!("{}: loaded {count} territory polygons", spec.table);
    Ok(count)
}

fn feature_to_row(feature: &serde_json::Value, spec: &LayerSpec<'_>) -> Option<RawTerritoryFeature> {
    let props = feature.get("properties").or_else(|| feature.get("attributes"))?;

    let name = props.get(spec.name_field)?.as_str()?.to_string();
    let state = props
        .get(spec.state_field)
        .and_then(serde_json::Value::as_str)
        .unwrap_or("")
        .to_string();
    let shape_type = props
        .get(spec.shape_type_field)
        .and_then(serde_json::Value::as_str)
        .unwrap_or("")
        .to_string();

    let area_km2 = spec
        .area_field
        .and_then(|f| props.get(f))
        .and_then(serde_json::Value::as_f64);
    let customers = spec
        .customers_field
        .and_then(|f| props.get(f))
        .and_then(serde_json::Value::as_i64);
    let eia_id = spec
        .eia_id_field
        .and_then(|f| props.get(f))
        .and_then(serde_json::Value::as_i64);
    let control_area = spec
        .control_area_field
        .and_then(|f| props.get(f))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);
    let pwsid = spec
        .pwsid_field
        .and_then(|f| props.get(f))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);
    let holding_company = spec
        .holding_company_field
        .and_then(|f| props.get(f))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);

    let geometry = feature.get("geometry").cloned().unwrap_or(serde_json::Value::Null);
    let geojson = geometry.to_string();

    Some(RawTerritoryFeature {
        name,
        state,
        shape_type,
        area_km2,
        customers,
        eia_id,
        control_area,
        pwsid,
        holding_company,
        geojson,
    })
}

fn raw_to_db_row(raw: RawTerritoryFeature) -> TerritoryRow {
    TerritoryRow {
        name: raw.name,
        state: raw.state,
        shape_type: raw.shape_type,
        area_km2: raw.area_km2,
        customers: raw.customers,
        eia_id: raw.eia_id,
        control_area: raw.control_area,
        pwsid: raw.pwsid,
        holding_company: raw.holding_company,
        source: "hifld".to_string(),
        geojson: raw.geojson,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn electric_spec(url: &str) -> LayerSpec<'_> {
        LayerSpec {
            query_url: url,
            table: "electric_territories",
            name_field: "NAME",
            state_field: "STATE",
            shape_type_field: "TYPE",
            area_field: Some("SHAPE__Area"),
            customers_field: Some("CUSTOMERS"),
            eia_id_field: Some("ID"),
            control_area_field: Some("CNTRL_AREA"),
            pwsid_field: None,
            holding_company_field: Some("HOLDING_CO"),
        }
    }

    #[test]
    fn feature_to_row_reads_configured_fields() {
        let spec = electric_spec("https://example.com/query");
        let feature = serde_json::json!({
            "properties": {
                "NAME": "ComEd",
                "STATE": "IL",
                "TYPE": "INVESTOR OWNED",
                "SHAPE__Area": 1234.5,
                "CUSTOMERS": 4_000_000,
                "ID": 1004,
                "CNTRL_AREA": "PJM",
                "HOLDING_CO": "Exelon",
            },
            "geometry": {"type": "Polygon", "coordinates": []},
        });

        let row = feature_to_row(&feature, &spec).unwrap();
        assert_eq!(row.name, "ComEd");
        assert_eq!(row.state, "IL");
        assert_eq!(row.eia_id, Some(1004));
        assert_eq!(row.holding_company.as_deref(), Some("Exelon"));
    }

    #[test]
    fn feature_missing_name_field_is_skipped() {
        let spec = electric_spec("https://example.com/query");
        let feature = serde_json::json!({"properties": {"STATE": "IL"}});
        assert!(feature_to_row(&feature, &spec).is_none());
    }
}
