//! Pure normalization of the FCC BDC `providers` JSONB column into the
//! summary shape the resolution engine returns for the internet
//! source. Kept free of any database dependency so it can be tested
//! without a live Postgres connection.

use std::collections::HashSet;

/// Technology code -> display label, per the FCC BDC technology
/// taxonomy.
fn tech_label(tech_code: &str) -> String {
    match tech_code {
        "10" => "DSL".to_string(),
        "40" => "Cable".to_string(),
        "50" => "Fiber".to_string(),
        "60" => "Satellite (GSO)".to_string(),
        "61" => "Satellite (NGSO)".to_string(),
        "70" => "Fixed Wireless (Licensed)".to_string(),
        "71" => "Fixed Wireless (Unlicensed)".to_string(),
        "72" => "Fixed Wireless (CBRS)".to_string(),
        "0" => "Other".to_string(),
        other => format!("Unknown ({other})"),
    }
}

/// Sort priority: fiber first, then cable, then everything else by
/// download speed. Lower sorts first.
const fn tech_priority(tech_code: &str) -> u8 {
    match tech_code.as_bytes() {
        b"50" => 0,
        b"40" => 1,
        b"10" => 2,
        b"70" => 3,
        b"72" => 4,
        b"71" => 5,
        b"60" => 6,
        b"61" => 7,
        _ => 8,
    }
}

/// Builds the `internet` summary object from the raw `providers`
/// array stored in the `internet_providers.providers` JSONB column.
/// Each entry is expected to carry `name`, `tech`, `down`, `up`, and
/// `low_lat` fields; missing fields default the same way the original
/// FCC BDC ingestion does (empty name, tech `"0"`, zero speed, not
/// low-latency).
pub fn build_summary(raw_providers: &[serde_json::Value]) -> serde_json::Value {
    let mut providers: Vec<serde_json::Value> = raw_providers
        .iter()
        .map(|p| {
            let tech_code = p.get("tech").map_or_else(|| "0".to_string(), |v| v.as_str().map_or_else(|| v.to_string(), str::to_string));
            let name = p.get("name").and_then(serde_json::Value::as_str).unwrap_or_default().to_string();
            let max_down = p.get("down").and_then(serde_json::Value::as_f64).unwrap_or(0.0);
            let max_up = p.get("up").and_then(serde_json::Value::as_f64).unwrap_or(0.0);
            let low_latency = p.get("low_lat").and_then(serde_json::Value::as_bool).unwrap_or(false);

            serde_json::json!({
                "name": name,
                "technology": tech_label(&tech_code),
                "techCode": tech_code,
                "maxDown": max_down,
                "maxUp": max_up,
                "lowLatency": low_latency,
            })
        })
        .collect();

    providers.sort_by(|a, b| {
        let a_code = a["techCode"].as_str().unwrap_or("0");
        let b_code = b["techCode"].as_str().unwrap_or("0");
        let a_down = a["maxDown"].as_f64().unwrap_or(0.0);
        let b_down = b["maxDown"].as_f64().unwrap_or(0.0);
        tech_priority(a_code).cmp(&tech_priority(b_code)).then_with(|| b_down.total_cmp(&a_down))
    });

    let has_fiber = providers.iter().any(|p| p["techCode"] == "50");
    let has_cable = providers.iter().any(|p| p["techCode"] == "40");
    let max_download_speed = providers.iter().filter_map(|p| p["maxDown"].as_f64()).fold(0.0_f64, f64::max);
    let provider_count = providers.iter().filter_map(|p| p["name"].as_str()).collect::<HashSet<_>>().len();

    serde_json::json!({
        "providers": providers,
        "providerCount": provider_count,
        "hasFiber": has_fiber,
        "hasCable": has_cable,
        "maxDownloadSpeed": max_download_speed,
        "source": "fcc_bdc",
        "confidence": 0.95,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_fiber_before_cable_before_dsl() {
        let raw = vec![
            serde_json::json!({"name": "SlowCo", "tech": "10", "down": 25, "up": 5, "low_lat": false}),
            serde_json::json!({"name": "CableCo", "tech": "40", "down": 200, "up": 20, "low_lat": false}),
            serde_json::json!({"name": "FiberCo", "tech": "50", "down": 1000, "up": 1000, "low_lat": true}),
        ];
        let summary = build_summary(&raw);
        let names: Vec<&str> = summary["providers"].as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["FiberCo", "CableCo", "SlowCo"]);
        assert_eq!(summary["hasFiber"], true);
        assert_eq!(summary["hasCable"], true);
        assert!((summary["maxDownloadSpeed"].as_f64().unwrap() - 1000.0).abs() < f64::EPSILON);
        assert_eq!(summary["providerCount"], 3);
        assert_eq!(summary["source"], "fcc_bdc");
    }

    #[test]
    fn breaks_ties_within_a_technology_by_speed_descending() {
        let raw = vec![
            serde_json::json!({"name": "A", "tech": "40", "down": 100, "up": 10, "low_lat": false}),
            serde_json::json!({"name": "B", "tech": "40", "down": 500, "up": 50, "low_lat": false}),
        ];
        let summary = build_summary(&raw);
        let names: Vec<&str> = summary["providers"].as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn empty_provider_list_has_no_fiber_or_cable() {
        let summary = build_summary(&[]);
        assert_eq!(summary["hasFiber"], false);
        assert_eq!(summary["hasCable"], false);
        assert_eq!(summary["maxDownloadSpeed"], 0.0);
        assert_eq!(summary["providerCount"], 0);
    }

    #[test]
    fn unknown_tech_code_gets_a_labeled_fallback_and_lowest_priority() {
        let raw = vec![
            serde_json::json!({"name": "Mystery", "tech": "99", "down": 10, "up": 1, "low_lat": false}),
            serde_json::json!({"name": "Dsl", "tech": "10", "down": 10, "up": 1, "low_lat": false}),
        ];
        let summary = build_summary(&raw);
        let providers = summary["providers"].as_array().unwrap();
        assert_eq!(providers[0]["name"], "Dsl");
        assert_eq!(providers[1]["technology"], "Unknown (99)");
    }
}
