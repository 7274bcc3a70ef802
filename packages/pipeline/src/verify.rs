//! EIA ZIP cross-verification for the electric primary (§4.7.5).
//!
//! Only runs when the primary wasn't itself sourced from a correction or
//! the EIA ZIP adapter (in both cases there is nothing independent left
//! to check it against).

use utility_lookup_adapters::EiaZipAdapter;

const STOPWORDS: &[&str] = &[
    "electric", "power", "energy", "company", "co", "corp", "corporation", "utilities",
    "utility", "cooperative", "coop", "inc", "llc", "the", "and", "&", "delivery", "service",
    "services", "of", "district",
];

fn significant_tokens(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Adjustment to apply to the primary's confidence, clipped by the
/// caller to `[0, 1]`.
#[must_use]
pub fn verify(eia_zip: &EiaZipAdapter, zip: &str, primary_display_name: &str) -> f64 {
    let Some(eia_hit) = eia_zip.lookup(zip) else {
        return -0.05;
    };

    if eia_hit.name.eq_ignore_ascii_case(primary_display_name) {
        return 0.05;
    }

    let primary_tokens = significant_tokens(primary_display_name);
    let eia_tokens = significant_tokens(&eia_hit.name);

    if !primary_tokens.is_empty() {
        let overlap = primary_tokens.iter().filter(|t| eia_tokens.contains(t)).count();
        #[allow(clippy::cast_precision_loss)]
        let ratio = overlap as f64 / primary_tokens.len() as f64;
        if ratio >= 0.5 {
            return 0.03;
        }
    }

    let primary_lower = primary_display_name.to_lowercase();
    let eia_lower = eia_hit.name.to_lowercase();
    if primary_lower.contains(&eia_lower) || eia_lower.contains(&primary_lower) {
        return 0.02;
    }

    -0.05
}

/// Applies [`verify`]'s adjustment to `confidence`, clipped to `[0, 1]`.
#[must_use]
pub fn apply(eia_zip: &EiaZipAdapter, zip: &str, primary_display_name: &str, confidence: f64) -> f64 {
    (confidence + verify(eia_zip, zip, primary_display_name)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_gets_maximum_boost() {
        let adapter = EiaZipAdapter::embedded();
        let adjustment = verify(&adapter, "75201", "Oncor Electric Delivery");
        assert!((adjustment - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_zip_penalizes() {
        let adapter = EiaZipAdapter::embedded();
        let adjustment = verify(&adapter, "00000", "Oncor Electric Delivery");
        assert!((adjustment - (-0.05)).abs() < f64::EPSILON);
    }

    #[test]
    fn apply_clips_to_unit_interval() {
        let adapter = EiaZipAdapter::embedded();
        let result = apply(&adapter, "75201", "Oncor Electric Delivery", 0.97);
        assert!(result <= 1.0);
    }
}
