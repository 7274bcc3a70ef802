//! Sewer inheritance from the water primary (§4.7.7).
//!
//! Sewer has no territory polygons or tabular adapters of its own: it is
//! overwhelmingly co-located with the water system, so the pipeline
//! tries to match the water primary's display name against the sewer
//! catalog partition before falling back to city/county name guesses.

use utility_lookup_id_matcher::ProviderIdMatcher;
use utility_lookup_models::{CandidateProvider, MatchMethod, UtilityType};

const SCORE_THRESHOLD_WATER_NAME: u32 = 80;
const SCORE_THRESHOLD_CITY_GUESS: u32 = 75;
const SCORE_THRESHOLD_COUNTY_GUESS: u32 = 70;

const CONFIDENCE_CITY_GUESS: f64 = 0.82;
const CONFIDENCE_COUNTY_GUESS: f64 = 0.75;
const CONFIDENCE_FALLBACK: f64 = 0.50;

/// Resolves a sewer candidate from the water primary (if any), the city,
/// and the county, per the four-step fallback chain.
#[must_use]
pub fn resolve(
    id_matcher: &ProviderIdMatcher,
    water_primary: Option<&CandidateProvider>,
    city: &str,
    county: &str,
    state: &str,
) -> Option<CandidateProvider> {
    if let Some(water) = water_primary {
        let confidence_cap = (water.confidence + 0.05).min(0.88);
        if let Some(matched) = id_matcher.match_provider(&water.display_name, UtilityType::Sewer, Some(state))
            && matched.match_score >= SCORE_THRESHOLD_WATER_NAME
        {
            return Some(build(&matched.title, confidence_cap, "water_inheritance", state));
        }
    }

    if !city.is_empty() {
        for candidate_name in [
            format!("City of {city}"),
            format!("{city} Sewer"),
            format!("{city} Utilities"),
            format!("{city} Public Works"),
            city.to_string(),
        ] {
            if let Some(matched) = id_matcher.match_provider(&candidate_name, UtilityType::Sewer, Some(state))
                && matched.match_score >= SCORE_THRESHOLD_CITY_GUESS
            {
                return Some(build(&matched.title, CONFIDENCE_CITY_GUESS, "sewer_city_guess", state));
            }
        }
    }

    if !county.is_empty() {
        for candidate_name in [
            format!("{county} County Sanitary"),
            format!("{county} Sanitary"),
            county.to_string(),
        ] {
            if let Some(matched) = id_matcher.match_provider(&candidate_name, UtilityType::Sewer, Some(state))
                && matched.match_score >= SCORE_THRESHOLD_COUNTY_GUESS
            {
                return Some(build(&matched.title, CONFIDENCE_COUNTY_GUESS, "sewer_county_guess", state));
            }
        }
    }

    water_primary.map(|water| build(&water.display_name, CONFIDENCE_FALLBACK, "water_fallback_no_sewer_id", state))
}

fn build(display_name: &str, confidence: f64, source: &str, state: &str) -> CandidateProvider {
    CandidateProvider {
        raw_name: display_name.to_string(),
        canonical_id: None,
        display_name: display_name.to_string(),
        eia_id: None,
        utility_type: UtilityType::Sewer,
        confidence,
        match_method: MatchMethod::Passthrough,
        polygon_source: source.to_string(),
        state: state.to_uppercase(),
        is_deregulated: false,
        deregulated_note: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water_candidate(name: &str, confidence: f64) -> CandidateProvider {
        CandidateProvider {
            raw_name: name.to_string(),
            canonical_id: None,
            display_name: name.to_string(),
            eia_id: None,
            utility_type: UtilityType::Water,
            confidence,
            match_method: MatchMethod::Passthrough,
            polygon_source: "state_gis".to_string(),
            state: "TX".to_string(),
            is_deregulated: false,
            deregulated_note: None,
        }
    }

    #[test]
    fn falls_back_to_water_name_when_nothing_matches() {
        let id_matcher = ProviderIdMatcher::embedded(Vec::new());
        let water = water_candidate("Some Obscure Private Water System", 0.80);
        let result = resolve(&id_matcher, Some(&water), "", "", "TX").unwrap();
        assert_eq!(result.polygon_source, "water_fallback_no_sewer_id");
        assert!((result.confidence - CONFIDENCE_FALLBACK).abs() < f64::EPSILON);
    }

    #[test]
    fn no_water_primary_and_no_city_or_county_returns_none() {
        let id_matcher = ProviderIdMatcher::embedded(Vec::new());
        assert!(resolve(&id_matcher, None, "", "", "TX").is_none());
    }
}
