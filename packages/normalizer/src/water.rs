//! Water-specific name normalization.
//!
//! EPA/SDWIS water system names and HIFLD water polygon names use a
//! different vocabulary than electric/gas utility names: comma-flipped
//! entity names ("Gilbert, Town Of"), abbreviations unique to water
//! districts (`Wtr`, `WSC`, `MUD N`), and trailing state tags that never
//! appear on electric utility names. This module handles that vocabulary
//! separately from [`crate::matcher::Normalizer`].

use std::sync::LazyLock;

use regex::Regex;

/// Expands water-district abbreviations. Order matters: longer, more
/// specific patterns are tried first so `"MUD N"` doesn't get swallowed
/// by a generic `"MUD"` rule.
const ABBREVIATION_EXPANSIONS: &[(&str, &str)] = &[
    ("Wtr", "Water"),
    ("WSC", "Water Supply Corporation"),
    ("MUD", "Municipal Utility District"),
];

static TRAILING_STATE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*-\s*[A-Z]{2}$").unwrap());

static COMMA_FLIPPED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.+),\s*(.+)$").unwrap());

/// EPA/SDWIS system names mapped to the canonical municipal name shown
/// in API responses.
const SDWIS_NAME_MAP: &[(&str, &str)] = &[
    ("charlotte-mecklenburg utilities", "Charlotte Water"),
    (
        "charlotte-mecklenburg utility department",
        "Charlotte Water",
    ),
    ("philadelphia water department", "City of Philadelphia"),
];

/// Normalizes a water system/district name for display: expands
/// abbreviations, strips trailing state tags, reverses comma-flipped
/// entity names, and applies the EPA/SDWIS name map.
#[must_use]
pub fn normalize_water_name(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    for (sdwis_name, canonical) in SDWIS_NAME_MAP {
        if lower == *sdwis_name {
            return (*canonical).to_string();
        }
    }

    let mut name = TRAILING_STATE_TAG.replace(raw.trim(), "").to_string();
    name = reverse_comma_flip(&name);
    name = expand_abbreviations(&name);
    name
}

/// "Gilbert, Town Of" -> "Town Of Gilbert". Only reverses when the
/// second segment looks like an entity type ("Town Of", "City Of",
/// "County Of", "Village Of") rather than a genuine comma in a longer
/// name.
fn reverse_comma_flip(name: &str) -> String {
    let Some(caps) = COMMA_FLIPPED.captures(name) else {
        return name.to_string();
    };
    let first = caps.get(1).map_or("", |m| m.as_str()).trim();
    let second = caps.get(2).map_or("", |m| m.as_str()).trim();

    let second_lower = second.to_lowercase();
    if ["town of", "city of", "county of", "village of"].contains(&second_lower.as_str()) {
        format!("{second} {first}")
    } else {
        name.to_string()
    }
}

fn expand_abbreviations(name: &str) -> String {
    let mut result = name.to_string();
    for (abbr, expanded) in ABBREVIATION_EXPANSIONS {
        // Whole-word match only: avoid expanding "Wtr" inside a longer token.
        let pattern = format!(r"(?i)\b{}\b", regex::escape(abbr));
        if let Ok(re) = Regex::new(&pattern) {
            result = re.replace_all(&result, *expanded).to_string();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverses_comma_flipped_town_name() {
        assert_eq!(normalize_water_name("Gilbert, Town Of"), "Town Of Gilbert");
    }

    #[test]
    fn strips_trailing_state_tag() {
        assert_eq!(
            normalize_water_name("Springfield Water - IL"),
            "Springfield Water"
        );
    }

    #[test]
    fn expands_mud_abbreviation() {
        assert_eq!(
            normalize_water_name("Harris County MUD 50"),
            "Harris County Municipal Utility District 50"
        );
    }

    #[test]
    fn maps_sdwis_name_to_canonical() {
        assert_eq!(
            normalize_water_name("Charlotte-Mecklenburg Utilities"),
            "Charlotte Water"
        );
    }
}
