#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fuzzy-matches resolved provider names to internal catalog IDs.
//!
//! The resolution pipeline (C7) produces a display name per utility type;
//! this crate maps that name to a stable catalog id a downstream billing
//! or comparison system already understands, along with a confidence
//! score describing how sure the match is.

pub mod catalog;
pub mod error;
pub mod normalize;
pub mod ratio;

pub use catalog::{CatalogEntry, ProviderCatalog};
pub use error::IdMatcherError;
pub use normalize::normalize_title;

use std::collections::HashMap;

use ratio::{token_set_ratio, token_sort_ratio};
use regex::Regex;
use std::sync::LazyLock;
use utility_lookup_models::{CatalogMatch, IdMappingCorrection, UtilityType};

const FUZZY_SCORE_CUTOFF: u32 = 82;
const FUZZY_SET_SCORE_CUTOFF: u32 = 90;
const STATE_SPECIFIC_SCORE_CUTOFF: u32 = 70;
const CONFIDENT_THRESHOLD: u32 = 85;

static STATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]+").unwrap());

fn utility_type_id(utility_type: UtilityType) -> &'static str {
    utility_type.catalog_type_id()
}

/// Matches free-text provider names against [`ProviderCatalog`] entries of
/// the same utility type, preferring (in order) an operator-entered
/// override, an exact normalized match, a state-qualified fuzzy match,
/// then an unscoped fuzzy match.
pub struct ProviderIdMatcher {
    catalog: ProviderCatalog,
    overrides: HashMap<(String, UtilityType), i32>,
}

impl ProviderIdMatcher {
    #[must_use]
    pub fn new(catalog: ProviderCatalog, id_overrides: Vec<IdMappingCorrection>) -> Self {
        let mut overrides = HashMap::new();
        for correction in id_overrides {
            let key = (
                normalize_title(&correction.engine_provider_name),
                correction.utility_type,
            );
            overrides.insert(key, correction.correct_catalog_id);
        }
        Self { catalog, overrides }
    }

    #[must_use]
    pub fn embedded(id_overrides: Vec<IdMappingCorrection>) -> Self {
        Self::new(ProviderCatalog::embedded(), id_overrides)
    }

    /// Matches one provider name within its utility type's catalog
    /// partition. `state` narrows the search to state-tagged catalog
    /// entries before falling back to an unscoped fuzzy scan.
    #[must_use]
    pub fn match_provider(
        &self,
        provider_name: &str,
        utility_type: UtilityType,
        state: Option<&str>,
    ) -> Option<CatalogMatch> {
        if provider_name.is_empty() {
            return None;
        }

        let type_id = utility_type_id(utility_type);
        let normalized_input = normalize_title(provider_name);

        if let Some(&id) = self.overrides.get(&(normalized_input.clone(), utility_type)) {
            let entry = self.catalog.by_id(id)?;
            return Some(Self::result(entry, 100, "override"));
        }

        let candidates = self.catalog.entries_for_type(type_id);

        for &entry in &candidates {
            if entry.normalized == normalized_input {
                return Some(Self::result(entry, 100, "exact"));
            }
        }

        if let Some(state) = state {
            let state_upper = state.to_uppercase();
            let mut state_matches: Vec<(u32, &CatalogEntry)> = candidates
                .iter()
                .filter(|entry| {
                    STATE_TOKEN
                        .find_iter(&entry.title.to_uppercase())
                        .any(|m| m.as_str() == state_upper)
                })
                .filter_map(|&entry| {
                    let score = token_sort_ratio(&normalized_input, &entry.normalized);
                    (score >= STATE_SPECIFIC_SCORE_CUTOFF).then_some((score, entry))
                })
                .collect();

            if !state_matches.is_empty() {
                state_matches.sort_by(|a, b| b.0.cmp(&a.0));
                let (score, entry) = state_matches[0];
                return Some(Self::result(entry, score, "state_specific"));
            }
        }

        let mut best_sort: Option<(u32, &CatalogEntry)> = None;
        for &entry in &candidates {
            let score = token_sort_ratio(&normalized_input, &entry.normalized);
            if score >= FUZZY_SCORE_CUTOFF && best_sort.is_none_or(|(best, _)| score > best) {
                best_sort = Some((score, entry));
            }
        }
        if let Some((score, entry)) = best_sort {
            return Some(Self::result(entry, score, "fuzzy"));
        }

        let mut best_set: Option<(u32, &CatalogEntry)> = None;
        for &entry in &candidates {
            let score = token_set_ratio(&normalized_input, &entry.normalized);
            if score >= FUZZY_SET_SCORE_CUTOFF && best_set.is_none_or(|(best, _)| score > best) {
                best_set = Some((score, entry));
            }
        }
        best_set.map(|(score, entry)| Self::result(entry, score, "fuzzy_set"))
    }

    fn result(entry: &CatalogEntry, score: u32, method: &str) -> CatalogMatch {
        CatalogMatch {
            id: entry.id,
            title: entry.title.clone(),
            url: entry.url.clone(),
            phone: entry.phone.clone(),
            match_score: score,
            match_method: method.to_string(),
            confident: score >= CONFIDENT_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> ProviderIdMatcher {
        ProviderIdMatcher::embedded(Vec::new())
    }

    #[test]
    fn exact_match_scores_one_hundred() {
        let m = matcher();
        let result = m.match_provider("ComEd", UtilityType::Electric, None).unwrap();
        assert_eq!(result.id, 2);
        assert_eq!(result.match_method, "exact");
        assert_eq!(result.match_score, 100);
        assert!(result.confident);
    }

    #[test]
    fn alias_resolves_through_normalization() {
        let m = matcher();
        let result = m.match_provider("SCE", UtilityType::Electric, None).unwrap();
        assert_eq!(result.id, 7);
    }

    #[test]
    fn fuzzy_match_tolerates_extra_words() {
        let m = matcher();
        let result = m
            .match_provider("Oncor Electric Delivery Company LLC", UtilityType::Electric, None)
            .unwrap();
        assert_eq!(result.id, 3);
        assert!(result.match_score >= FUZZY_SCORE_CUTOFF);
    }

    #[test]
    fn override_beats_every_other_method() {
        let overrides = vec![IdMappingCorrection {
            engine_provider_name: "Weird OCR Name".to_string(),
            utility_type: UtilityType::Electric,
            correct_catalog_id: 2,
        }];
        let m = ProviderIdMatcher::embedded(overrides);
        let result = m.match_provider("Weird OCR Name", UtilityType::Electric, None).unwrap();
        assert_eq!(result.id, 2);
        assert_eq!(result.match_method, "override");
    }

    #[test]
    fn unmatched_name_returns_none() {
        let m = matcher();
        assert!(
            m.match_provider("Totally Unrelated Made Up Company Name", UtilityType::Electric, None)
                .is_none()
        );
    }

    #[test]
    fn matching_is_scoped_to_its_own_utility_type() {
        let m = matcher();
        // "ComEd" only exists in the electric partition (type_id 2), never water.
        assert!(m.match_provider("ComEd", UtilityType::Water, None).is_none());
    }

    #[test]
    fn empty_name_returns_none() {
        let m = matcher();
        assert!(m.match_provider("", UtilityType::Electric, None).is_none());
    }
}
