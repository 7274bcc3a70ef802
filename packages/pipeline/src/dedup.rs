//! Deduplication and multi-source agreement boosting (§4.7.2).

use std::collections::BTreeMap;

use utility_lookup_models::CandidateProvider;

/// Groups candidates by canonical id (or uppercased display name when
/// there isn't one), keeps the highest-confidence candidate per group,
/// and boosts its confidence when multiple distinct sources agree.
///
/// Iteration order is a `BTreeMap`, never a hash map, so output order is
/// stable across runs with the same input.
#[must_use]
pub fn dedup_and_boost(candidates: Vec<CandidateProvider>) -> Vec<CandidateProvider> {
    let mut groups: BTreeMap<String, Vec<CandidateProvider>> = BTreeMap::new();

    for candidate in candidates {
        let key = candidate
            .canonical_id
            .clone()
            .unwrap_or_else(|| candidate.display_name.to_uppercase());
        groups.entry(key).or_default().push(candidate);
    }

    let mut deduped: Vec<CandidateProvider> = Vec::with_capacity(groups.len());

    for (_, mut members) in groups {
        members.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));

        let distinct_sources: std::collections::BTreeSet<&str> =
            members.iter().map(|m| m.polygon_source.as_str()).collect();
        let agreeing = distinct_sources.len();

        let mut best = members.remove(0);
        if agreeing > 1 {
            let boost = (0.05 * f64::from(u32::try_from(agreeing - 1).unwrap_or(u32::MAX))).min(0.10);
            best.confidence = (best.confidence + boost).min(0.98);
            best.polygon_source = format!("{} (+{} agree)", best.polygon_source, agreeing - 1);
        }

        deduped.push(best);
    }

    deduped.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use utility_lookup_models::{MatchMethod, UtilityType};

    fn candidate(name: &str, canonical_id: Option<&str>, confidence: f64, source: &str) -> CandidateProvider {
        CandidateProvider {
            raw_name: name.to_string(),
            canonical_id: canonical_id.map(String::from),
            display_name: name.to_string(),
            eia_id: None,
            utility_type: UtilityType::Electric,
            confidence,
            match_method: MatchMethod::Exact,
            polygon_source: source.to_string(),
            state: "IL".to_string(),
            is_deregulated: false,
            deregulated_note: None,
        }
    }

    #[test]
    fn single_source_is_unboosted() {
        let result = dedup_and_boost(vec![candidate("ComEd", Some("comed"), 0.85, "spatial")]);
        assert_eq!(result.len(), 1);
        assert!((result[0].confidence - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn two_agreeing_sources_boost_by_point_zero_five() {
        let result = dedup_and_boost(vec![
            candidate("ComEd", Some("comed"), 0.85, "spatial"),
            candidate("ComEd", Some("comed"), 0.80, "eia_zip"),
        ]);
        assert_eq!(result.len(), 1);
        assert!((result[0].confidence - 0.90).abs() < 1e-9);
        assert!(result[0].polygon_source.contains("+1 agree"));
    }

    #[test]
    fn boost_is_capped_at_point_one_zero() {
        let result = dedup_and_boost(vec![
            candidate("ComEd", Some("comed"), 0.85, "a"),
            candidate("ComEd", Some("comed"), 0.80, "b"),
            candidate("ComEd", Some("comed"), 0.75, "c"),
            candidate("ComEd", Some("comed"), 0.70, "d"),
        ]);
        assert!((result[0].confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn distinct_ids_stay_separate_groups() {
        let result = dedup_and_boost(vec![
            candidate("ComEd", Some("comed"), 0.85, "a"),
            candidate("Ameren Illinois", Some("ameren_il"), 0.80, "b"),
        ]);
        assert_eq!(result.len(), 2);
    }
}
