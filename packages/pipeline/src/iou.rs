//! Primary selection and large-IOU demotion (§4.7.4).
//!
//! A large investor-owned utility's territory polygon often blankets an
//! entire state, but a local co-op or municipal system can sit entirely
//! inside it and actually serve the address. When both show up as
//! candidates, the local utility wins.

use utility_lookup_models::CandidateProvider;

const LARGE_IOUS: &[&str] = &[
    "Duke Energy",
    "Georgia Power",
    "Pacific Gas and Electric",
    "Southern California Edison",
    "San Diego Gas & Electric",
    "Florida Power & Light",
    "Dominion Energy",
    "American Electric Power",
    "Entergy",
    "Xcel Energy",
    "Consumers Energy",
    "DTE Energy",
    "PPL Electric Utilities",
    "PECO Energy",
    "Baltimore Gas and Electric",
    "Potomac Electric Power",
    "Commonwealth Edison",
    "Public Service Electric and Gas",
    "Consolidated Edison",
    "National Grid",
];

const LOCAL_UTILITY_KEYWORDS: &[&str] = &[
    "cooperative",
    "coop",
    "electric membership",
    "municipal",
    "city of",
    "town of",
    "public utilities",
    "utilities commission",
    "pud",
    "public utility district",
    "emc",
    "cpw",
    "rea",
    "rec",
];

/// Named local utilities that read as investor-owned or opaque but are
/// not: curated because their names carry none of
/// [`LOCAL_UTILITY_KEYWORDS`].
const LOCAL_UTILITY_WHITELIST: &[&str] = &[
    "Energy United",
    "BrightRidge",
    "JEA",
    "Greer CPW",
    "Santee Cooper",
    "SECO Energy",
    "Pedernales Electric",
    "New Braunfels Utilities",
    "Bryan Texas Utilities",
    "CPS Energy",
    "Austin Energy",
    "EPB",
    "Gainesville Regional Utilities",
    "Kissimmee Utility Authority",
    "Talquin Electric",
    "Coweta-Fayette EMC",
];

const EXEMPT_SOURCES: &[&str] = &["findenergy_city", "state_gas_default"];

fn is_large_iou(name: &str) -> bool {
    LARGE_IOUS.iter().any(|n| name.eq_ignore_ascii_case(n))
}

fn looks_like_local_utility(name: &str) -> bool {
    let lower = name.to_lowercase();
    LOCAL_UTILITY_KEYWORDS.iter().any(|kw| lower.contains(kw))
        || LOCAL_UTILITY_WHITELIST.iter().any(|n| name.eq_ignore_ascii_case(n))
}

fn exempt_source(source: &str) -> bool {
    EXEMPT_SOURCES.iter().any(|s| source.starts_with(s))
}

/// Picks the primary candidate from a deduplicated, confidence-sorted
/// list, demoting a provisional large-IOU primary in favor of a local
/// utility alternative when one qualifies.
#[must_use]
pub fn select_primary(deduped: &[CandidateProvider]) -> Option<usize> {
    if deduped.is_empty() {
        return None;
    }

    let provisional = &deduped[0];
    if !is_large_iou(&provisional.display_name) {
        return Some(0);
    }

    deduped.iter().position(|c| {
        !std::ptr::eq(c, provisional)
            && looks_like_local_utility(&c.display_name)
            && c.confidence >= 0.70
            && !exempt_source(&c.polygon_source)
    }).or(Some(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use utility_lookup_models::{MatchMethod, UtilityType};

    fn candidate(name: &str, confidence: f64, source: &str) -> CandidateProvider {
        CandidateProvider {
            raw_name: name.to_string(),
            canonical_id: None,
            display_name: name.to_string(),
            eia_id: None,
            utility_type: UtilityType::Electric,
            confidence,
            match_method: MatchMethod::Exact,
            polygon_source: source.to_string(),
            state: "GA".to_string(),
            is_deregulated: false,
            deregulated_note: None,
        }
    }

    #[test]
    fn local_cooperative_demotes_large_iou() {
        let candidates = vec![
            candidate("Georgia Power", 0.90, "spatial:hifld"),
            candidate("Coweta-Fayette EMC", 0.85, "georgia_emc"),
        ];
        let idx = select_primary(&candidates).unwrap();
        assert_eq!(candidates[idx].display_name, "Coweta-Fayette EMC");
    }

    #[test]
    fn findenergy_city_source_is_exempt_from_promotion() {
        let candidates = vec![
            candidate("Georgia Power", 0.90, "spatial:hifld"),
            candidate("Acme City Utilities", 0.85, "findenergy_city"),
        ];
        let idx = select_primary(&candidates).unwrap();
        assert_eq!(candidates[idx].display_name, "Georgia Power");
    }

    #[test]
    fn non_iou_primary_is_unaffected() {
        let candidates = vec![candidate("Pedernales Electric Cooperative", 0.90, "spatial:hifld")];
        let idx = select_primary(&candidates).unwrap();
        assert_eq!(idx, 0);
    }
}
