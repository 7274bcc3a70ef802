//! US Census Bureau Geocoder client.
//!
//! Supports both single-address and batch geocoding via the Census Bureau's
//! free geocoding service. No API key required.
//!
//! - Single: `GET /geocoder/locations/address`
//! - Batch: `POST /geocoder/locations/addressbatch` (up to 10,000 rows)
//!
//! See <https://geocoding.geo.census.gov/geocoder/Geocoding_Services_API.html>

use std::fmt::Write as _;

use reqwest::multipart;
use utility_lookup_models::GeocodedAddress;

use crate::{AddressInput, BatchResult, GeocodeError, GeocoderConfig, MatchQuality};

/// Maximum number of addresses per batch request (Census Bureau limit).
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Geocodes a single address using the Census Bureau structured endpoint.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn geocode_single(
    client: &reqwest::Client,
    config: &GeocoderConfig,
    street: &str,
    city: &str,
    state: &str,
    zip: Option<&str>,
) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let mut url = format!(
        "{base_url}/locations/address\
         ?street={street}\
         &city={city}\
         &state={state}\
         &benchmark={benchmark}\
         &format=json",
        base_url = config.base_url,
        street = urlencoding(street),
        city = urlencoding(city),
        state = urlencoding(state),
        benchmark = config.benchmark,
    );

    if let Some(z) = zip {
        write!(url, "&zip={}", urlencoding(z)).unwrap();
    }

    let resp = client.get(&url).send().await?;
    let body: serde_json::Value = resp.json().await?;

    parse_single_response(&body)
}

/// Geocodes a single raw, unparsed address string using the Census
/// Bureau's `onelineaddress` endpoint. Use this for free-text input
/// that hasn't already been split into street/city/state/zip —
/// [`geocode_single`] hands the whole string to `street` and passes
/// blank `city`/`state`, which the structured endpoint requires and
/// will not match.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn geocode_oneline(
    client: &reqwest::Client,
    config: &GeocoderConfig,
    address: &str,
) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let url = format!(
        "{base_url}/locations/onelineaddress\
         ?address={address}\
         &benchmark={benchmark}\
         &format=json",
        base_url = config.base_url,
        address = urlencoding(address),
        benchmark = config.benchmark,
    );

    let resp = client.get(&url).send().await?;
    let body: serde_json::Value = resp.json().await?;

    parse_single_response(&body)
}

/// Geocodes a batch of addresses using the Census Bureau batch endpoint.
///
/// Addresses are submitted as a CSV file via `multipart/form-data`.
/// The batch endpoint accepts up to [`MAX_BATCH_SIZE`] addresses.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn geocode_batch(
    client: &reqwest::Client,
    config: &GeocoderConfig,
    addresses: &[AddressInput],
) -> Result<BatchResult, GeocodeError> {
    if addresses.is_empty() {
        return Ok(BatchResult {
            matched: Vec::new(),
            unmatched: Vec::new(),
        });
    }

    let mut csv_content = String::new();
    for addr in addresses {
        writeln!(
            csv_content,
            "\"{}\",\"{}\",\"{}\",\"{}\",\"{}\"",
            escape_csv(&addr.id),
            escape_csv(&addr.street),
            escape_csv(&addr.city),
            escape_csv(&addr.state),
            addr.zip.as_deref().unwrap_or(""),
        )
        .unwrap();
    }

    let form = multipart::Form::new().text("benchmark", config.benchmark.clone()).part(
        "addressFile",
        multipart::Part::text(csv_content)
            .file_name("addresses.csv")
            .mime_str("text/csv")
            .map_err(|e| GeocodeError::Parse {
                message: format!("failed to set MIME type: {e}"),
            })?,
    );

    let url = format!("{}/locations/addressbatch", config.base_url);
    let resp = client.post(&url).multipart(form).timeout(std::time::Duration::from_secs(180)).send().await?;

    let body = resp.text().await?;
    Ok(parse_batch_response(&body))
}

fn parse_single_response(body: &serde_json::Value) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let matches = body["result"]["addressMatches"].as_array().ok_or_else(|| GeocodeError::Parse {
        message: "missing addressMatches array".to_string(),
    })?;

    let Some(first) = matches.first() else {
        return Ok(None);
    };

    let x = first["coordinates"]["x"].as_f64().ok_or_else(|| GeocodeError::Parse {
        message: "missing x coordinate".to_string(),
    })?;
    let y = first["coordinates"]["y"].as_f64().ok_or_else(|| GeocodeError::Parse {
        message: "missing y coordinate".to_string(),
    })?;

    let matched_address = first["matchedAddress"].as_str().unwrap_or_default();
    let (city, state, zip) = split_matched_address(matched_address);
    let block_geoid = first["geographies"]["Census Blocks"][0]["GEOID"].as_str().map(String::from);

    Ok(Some(GeocodedAddress {
        lat: y,
        lon: x,
        confidence: MatchQuality::Exact.confidence(),
        formatted_address: Some(matched_address.to_string()),
        city,
        state,
        zip,
        county: None,
        block_geoid,
    }))
}

/// Parses the CSV response from the batch endpoint.
///
/// Response format (one row per input):
/// ```text
/// "ID","InputAddress","Match"|"No_Match","Exact"|"Non_Exact","MatchedAddr","lng,lat","TigerLine","Side"
/// ```
fn parse_batch_response(body: &str) -> BatchResult {
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields = parse_csv_line(line);
        if fields.len() < 3 {
            continue;
        }

        let id = fields[0].clone();

        if fields[2] == "Match" && fields.len() >= 6 {
            let quality = if fields.get(3).is_some_and(|f| f == "Exact") { MatchQuality::Exact } else { MatchQuality::Approximate };

            let matched_address = fields.get(4).cloned().unwrap_or_default();
            let coords_str = fields.get(5).map_or("", String::as_str);
            let (city, state, zip) = split_matched_address(&matched_address);

            if let Some((lng, lat)) = parse_coord_pair(coords_str) {
                matched.push((
                    id,
                    GeocodedAddress {
                        lat,
                        lon: lng,
                        confidence: quality.confidence(),
                        formatted_address: Some(matched_address),
                        city,
                        state,
                        zip,
                        county: None,
                        block_geoid: None,
                    },
                ));
            } else {
                unmatched.push(id);
            }
        } else {
            unmatched.push(id);
        }
    }

    BatchResult { matched, unmatched }
}

/// Splits a Census Bureau matched-address string ("100 MAIN ST, CHICAGO,
/// IL, 60601") into (city, state, zip). Returns `None` components rather
/// than failing when the format doesn't match, since the caller already
/// has coordinates and shouldn't discard the match over a display detail.
fn split_matched_address(matched: &str) -> (Option<String>, Option<String>, Option<String>) {
    let parts: Vec<&str> = matched.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [_, city, state, zip] if !zip.is_empty() => (Some((*city).to_string()), Some((*state).to_string()), Some((*zip).to_string())),
        [_, city, state, ..] => (Some((*city).to_string()), Some((*state).to_string()), None),
        _ => (None, None, None),
    }
}

/// Parses a "lng,lat" coordinate pair from the Census batch response.
fn parse_coord_pair(s: &str) -> Option<(f64, f64)> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return None;
    }
    let lng = parts[0].trim().parse::<f64>().ok()?;
    let lat = parts[1].trim().parse::<f64>().ok()?;
    Some((lng, lat))
}

/// Simple CSV line parser that handles quoted fields.
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '"' {
            if in_quotes {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                in_quotes = true;
            }
        } else if ch == ',' && !in_quotes {
            fields.push(current.trim().to_string());
            current = String::new();
        } else {
            current.push(ch);
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Minimal percent-encoding for URL query parameters.
fn urlencoding(s: &str) -> String {
    s.replace(' ', "+").replace('&', "%26").replace('#', "%23").replace('?', "%3F").replace('/', "%2F")
}

fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_match() {
        let body = serde_json::json!({
            "result": {
                "addressMatches": [{
                    "coordinates": { "x": -76.927_487, "y": 38.846_016 },
                    "matchedAddress": "4600 SILVER HILL RD, WASHINGTON, DC, 20233"
                }]
            }
        });
        let result = parse_single_response(&body).unwrap().unwrap();
        assert!((result.lon - -76.927_487).abs() < 1e-6);
        assert!((result.lat - 38.846_016).abs() < 1e-6);
        assert_eq!(result.city.as_deref(), Some("WASHINGTON"));
        assert_eq!(result.state.as_deref(), Some("DC"));
        assert_eq!(result.zip.as_deref(), Some("20233"));
    }

    #[test]
    fn parses_oneline_match_same_as_structured() {
        // onelineaddress and locations/address share a response shape;
        // geocode_oneline reuses parse_single_response unchanged.
        let body = serde_json::json!({
            "result": {
                "addressMatches": [{
                    "coordinates": { "x": -96.797, "y": 32.779 },
                    "matchedAddress": "200 OAK AVE, DALLAS, TX, 75201",
                    "geographies": { "Census Blocks": [{ "GEOID": "481130123456789" }] }
                }]
            }
        });
        let result = parse_single_response(&body).unwrap().unwrap();
        assert_eq!(result.city.as_deref(), Some("DALLAS"));
        assert_eq!(result.block_geoid.as_deref(), Some("481130123456789"));
    }

    #[test]
    fn parses_single_no_match() {
        let body = serde_json::json!({
            "result": { "addressMatches": [] }
        });
        assert!(parse_single_response(&body).unwrap().is_none());
    }

    #[test]
    fn parses_batch_response() {
        let csv = r#""1","100 Main St, Chicago, IL, ","Match","Exact","100 MAIN ST, CHICAGO, IL, 60601","-87.627,41.882","12345","L"
"2","Unknown, , , ","No_Match"
"3","200 Oak Ave, Dallas, TX, ","Match","Non_Exact","200 OAK AVE, DALLAS, TX, 75201","-96.795,32.780","67890","R"
"#;
        let result = parse_batch_response(csv);
        assert_eq!(result.matched.len(), 2);
        assert_eq!(result.unmatched.len(), 1);
        assert_eq!(result.matched[0].0, "1");
        assert!((result.matched[0].1.confidence - MatchQuality::Exact.confidence()).abs() < f64::EPSILON);
        assert!((result.matched[1].1.confidence - MatchQuality::Approximate.confidence()).abs() < f64::EPSILON);
        assert_eq!(result.unmatched[0], "2");
    }

    #[test]
    fn parses_coord_pair() {
        assert_eq!(parse_coord_pair("-87.627,41.882"), Some((-87.627, 41.882)));
        assert_eq!(parse_coord_pair("invalid"), None);
        assert_eq!(parse_coord_pair(""), None);
    }

    #[test]
    fn parses_csv_with_quotes() {
        let fields = parse_csv_line(r#""hello","world","foo,bar""#);
        assert_eq!(fields, vec!["hello", "world", "foo,bar"]);
    }

    #[test]
    fn splits_matched_address_into_components() {
        let (city, state, zip) = split_matched_address("100 MAIN ST, CHICAGO, IL, 60601");
        assert_eq!(city.as_deref(), Some("CHICAGO"));
        assert_eq!(state.as_deref(), Some("IL"));
        assert_eq!(zip.as_deref(), Some("60601"));
    }
}
