#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ensemble confidence scoring and deregulated-market detection.
//!
//! Takes one candidate's raw source data (a name, an optional EIA id, the
//! territory polygon it came from) and turns it into a scored
//! [`CandidateProvider`], resolving the name against the canonical
//! provider table along the way. The resolution pipeline (C7) calls this
//! once per candidate before deduplication and overlap arbitration.

pub mod contacts;
pub mod error;
pub mod tdu;

pub use contacts::ContactTable;
pub use error::ScorerError;
pub use tdu::TduPriority;

use utility_lookup_models::{CandidateProvider, MatchMethod, UtilityType};
use utility_lookup_normalizer::canonical::CanonicalIndex;
use utility_lookup_normalizer::matcher::{NormalizeMatchType, Normalizer};

/// Confidence ceiling after every adjustment; no candidate is ever
/// reported as fully certain.
const MAX_CONFIDENCE: f64 = 0.98;

const CONFIDENCE_EXACT: f64 = 0.85;
const CONFIDENCE_FUZZY: f64 = 0.75;
const CONFIDENCE_SUBSTRING: f64 = 0.75;
const CONFIDENCE_PASSTHROUGH: f64 = 0.60;
const CONFIDENCE_EIA_ID: f64 = 0.90;

/// Water names are never matched against the canonical table: water
/// utilities are overwhelmingly single-county municipal systems, and
/// SDWIS/HIFLD names are already close to canonical. Matching confidence
/// reflects that this is a geometry-sourced name rather than a
/// cross-checked identity.
const CONFIDENCE_WATER_PASSTHROUGH: f64 = 0.82;

/// Below this token-sort-ratio, a fuzzy match additionally requires its
/// canonical entry's state qualifier (if any) to agree with the
/// candidate's state before being accepted.
const STATE_CHECK_THRESHOLD: u32 = 95;

/// Full state names that show up as per-subsidiary qualifiers in
/// multi-state holding company names (American Water, Aqua America, and
/// similar). Used only to catch an obviously wrong cross-state fuzzy
/// match; absence from this list never blocks a match.
const STATE_QUALIFIERS: &[(&str, &str)] = &[
    ("missouri", "MO"),
    ("pennsylvania", "PA"),
    ("indiana", "IN"),
    ("illinois", "IL"),
    ("new jersey", "NJ"),
    ("west virginia", "WV"),
    ("california", "CA"),
    ("texas", "TX"),
    ("virginia", "VA"),
    ("ohio", "OH"),
    ("georgia", "GA"),
    ("kentucky", "KY"),
    ("tennessee", "TN"),
    ("iowa", "IA"),
];

/// Curated names of investor-owned transmission/distribution utilities
/// that only ever serve a deregulated retail market. Co-ops and
/// municipals are never deregulated, with the single explicit exception
/// of Lubbock Power & Light (see [`is_deregulated`]).
const ERCOT_TDU_SHAPE_TYPE: &str = "INVESTOR OWNED";

/// True iff `control_area` names the Texas grid operator.
fn is_ercot(control_area: Option<&str>) -> bool {
    control_area.is_some_and(|ca| ca.eq_ignore_ascii_case("ercot"))
}

fn state_qualifier_conflicts(display_name: &str, state: &str) -> bool {
    let lower = display_name.to_lowercase();
    STATE_QUALIFIERS.iter().any(|(name, abbr)| {
        lower.contains(name) && !abbr.eq_ignore_ascii_case(state)
    })
}

/// Scores one candidate's name against the canonical provider table and
/// flags deregulated-market status.
pub struct EnsembleScorer<'a> {
    normalizer: Normalizer<'a>,
    canonical: &'a CanonicalIndex,
    contacts: &'a ContactTable,
    tdu: &'a TduPriority,
    lubbock_deregulated: bool,
}

impl<'a> EnsembleScorer<'a> {
    #[must_use]
    pub const fn new(
        normalizer: Normalizer<'a>,
        canonical: &'a CanonicalIndex,
        contacts: &'a ContactTable,
        tdu: &'a TduPriority,
    ) -> Self {
        Self {
            normalizer,
            canonical,
            contacts,
            tdu,
            lubbock_deregulated: true,
        }
    }

    /// Resolves one candidate's raw source data into a scored
    /// [`CandidateProvider`].
    ///
    /// `area_km2`, `control_area`, and `shape_type` come from the
    /// territory polygon the candidate was sourced from, when there is
    /// one (tabular adapters that never touch a polygon pass `None`).
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn resolve_provider(
        &self,
        raw_name: &str,
        eia_id: Option<u32>,
        state: &str,
        utility_type: UtilityType,
        polygon_source: &str,
        control_area: Option<&str>,
        shape_type: Option<&str>,
    ) -> CandidateProvider {
        if utility_type == UtilityType::Water {
            return self.water_passthrough(raw_name, state, polygon_source);
        }

        if let Some(id) = eia_id
            && let Some((canonical_id, entry)) = self.canonical.lookup_by_eia_id(id)
        {
            return self.finish(
                raw_name,
                Some(canonical_id.to_string()),
                entry.display_name.clone(),
                Some(id),
                utility_type,
                CONFIDENCE_EIA_ID,
                MatchMethod::EiaId,
                polygon_source,
                state,
                control_area,
                shape_type,
            );
        }

        let normalized = self.normalizer.normalize(raw_name);

        let (canonical_id, display_name, confidence, match_method) = match normalized.match_type {
            NormalizeMatchType::Exact => (
                normalized.canonical_id,
                normalized.display_name,
                CONFIDENCE_EXACT,
                MatchMethod::Exact,
            ),
            NormalizeMatchType::Fuzzy => {
                let rejected = normalized.similarity < STATE_CHECK_THRESHOLD
                    && state_qualifier_conflicts(&normalized.display_name, state);
                if rejected {
                    (
                        None,
                        utility_lookup_normalizer::matcher::clean_passthrough(raw_name),
                        CONFIDENCE_PASSTHROUGH,
                        MatchMethod::Passthrough,
                    )
                } else {
                    (
                        normalized.canonical_id,
                        normalized.display_name,
                        CONFIDENCE_FUZZY,
                        MatchMethod::Fuzzy,
                    )
                }
            }
            NormalizeMatchType::Substring => (
                normalized.canonical_id,
                normalized.display_name,
                CONFIDENCE_SUBSTRING,
                MatchMethod::Substring,
            ),
            NormalizeMatchType::NullValue
            | NormalizeMatchType::Propane
            | NormalizeMatchType::None => (
                None,
                normalized.display_name,
                CONFIDENCE_PASSTHROUGH,
                MatchMethod::Passthrough,
            ),
        };

        self.finish(
            raw_name,
            canonical_id,
            display_name,
            eia_id,
            utility_type,
            confidence,
            match_method,
            polygon_source,
            state,
            control_area,
            shape_type,
        )
    }

    fn water_passthrough(&self, raw_name: &str, state: &str, polygon_source: &str) -> CandidateProvider {
        let display_name = utility_lookup_water_name(raw_name);
        CandidateProvider {
            raw_name: raw_name.to_string(),
            canonical_id: None,
            display_name,
            eia_id: None,
            utility_type: UtilityType::Water,
            confidence: CONFIDENCE_WATER_PASSTHROUGH.min(MAX_CONFIDENCE),
            match_method: MatchMethod::Passthrough,
            polygon_source: polygon_source.to_string(),
            state: state.to_uppercase(),
            is_deregulated: false,
            deregulated_note: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        raw_name: &str,
        canonical_id: Option<String>,
        display_name: String,
        eia_id: Option<u32>,
        utility_type: UtilityType,
        confidence: f64,
        match_method: MatchMethod,
        polygon_source: &str,
        state: &str,
        control_area: Option<&str>,
        shape_type: Option<&str>,
    ) -> CandidateProvider {
        let (is_deregulated, deregulated_note) =
            self.detect_deregulation(utility_type, &display_name, control_area, shape_type);

        CandidateProvider {
            raw_name: raw_name.to_string(),
            canonical_id,
            display_name,
            eia_id,
            utility_type,
            confidence: confidence.min(MAX_CONFIDENCE),
            match_method,
            polygon_source: polygon_source.to_string(),
            state: state.to_uppercase(),
            is_deregulated,
            deregulated_note,
        }
    }

    /// Electric-only. A candidate is deregulated iff it sits on the ERCOT
    /// grid, its polygon is investor-owned, and its name is a recognized
    /// TDU — except Lubbock Power & Light, a municipal utility inside
    /// ERCOT's single-member deregulated carve-out.
    fn detect_deregulation(
        &self,
        utility_type: UtilityType,
        display_name: &str,
        control_area: Option<&str>,
        shape_type: Option<&str>,
    ) -> (bool, Option<String>) {
        if utility_type != UtilityType::Electric {
            return (false, None);
        }

        if self.lubbock_deregulated && display_name.contains("Lubbock") {
            return (
                true,
                Some("Lubbock Power & Light opted into ERCOT retail choice in 2023".to_string()),
            );
        }

        if !is_ercot(control_area) {
            return (false, None);
        }

        let investor_owned = shape_type.is_some_and(|st| st.eq_ignore_ascii_case(ERCOT_TDU_SHAPE_TYPE));
        if investor_owned && self.tdu.is_tdu(display_name) {
            return (
                true,
                Some(format!("{display_name} is a transmission/distribution utility; retail service is competitive")),
            );
        }

        (false, None)
    }

    #[must_use]
    pub fn contacts_for(&self, canonical_id: &str, utility_type: UtilityType) -> (Option<String>, Option<String>) {
        self.contacts.lookup(canonical_id, utility_type)
    }
}

/// Water names never run through the canonical table; they still get the
/// legal-suffix/abbreviation cleanup a passthrough name needs.
fn utility_lookup_water_name(raw_name: &str) -> String {
    utility_lookup_normalizer::water::normalize_water_name(raw_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use utility_lookup_normalizer::canonical::CanonicalIndex;

    fn scorer(canonical: &CanonicalIndex, contacts: &ContactTable, tdu: &TduPriority, rep_ids: &[String]) -> EnsembleScorer<'_> {
        EnsembleScorer::new(Normalizer::new(canonical, rep_ids), canonical, contacts, tdu)
    }

    #[test]
    fn water_short_circuits_to_passthrough_confidence() {
        let canonical = CanonicalIndex::embedded().unwrap();
        let contacts = ContactTable::embedded();
        let tdu = TduPriority::embedded();
        let rep_ids: Vec<String> = Vec::new();
        let s = scorer(&canonical, &contacts, &tdu, &rep_ids);

        let candidate = s.resolve_provider(
            "Gilbert, Town Of",
            None,
            "AZ",
            UtilityType::Water,
            "state_gis",
            None,
            None,
        );
        assert!((candidate.confidence - CONFIDENCE_WATER_PASSTHROUGH).abs() < f64::EPSILON);
        assert_eq!(candidate.match_method, MatchMethod::Passthrough);
    }

    #[test]
    fn eia_id_match_beats_name_matching() {
        let canonical = CanonicalIndex::embedded().unwrap();
        let contacts = ContactTable::embedded();
        let tdu = TduPriority::embedded();
        let rep_ids: Vec<String> = Vec::new();
        let s = scorer(&canonical, &contacts, &tdu, &rep_ids);

        let candidate = s.resolve_provider(
            "Some Garbled OCR Name",
            Some(1004),
            "IL",
            UtilityType::Electric,
            "state_gis",
            None,
            None,
        );
        assert_eq!(candidate.canonical_id.as_deref(), Some("comed"));
        assert_eq!(candidate.match_method, MatchMethod::EiaId);
        assert!((candidate.confidence - CONFIDENCE_EIA_ID).abs() < f64::EPSILON);
    }

    #[test]
    fn ercot_investor_owned_tdu_is_flagged_deregulated() {
        let canonical = CanonicalIndex::embedded().unwrap();
        let contacts = ContactTable::embedded();
        let tdu = TduPriority::embedded();
        let rep_ids: Vec<String> = Vec::new();
        let s = scorer(&canonical, &contacts, &tdu, &rep_ids);

        let candidate = s.resolve_provider(
            "Oncor Electric Delivery Company LLC",
            None,
            "TX",
            UtilityType::Electric,
            "state_gis",
            Some("ERCOT"),
            Some("INVESTOR OWNED"),
        );
        assert!(candidate.is_deregulated);
    }

    #[test]
    fn non_ercot_investor_owned_is_not_deregulated() {
        let canonical = CanonicalIndex::embedded().unwrap();
        let contacts = ContactTable::embedded();
        let tdu = TduPriority::embedded();
        let rep_ids: Vec<String> = Vec::new();
        let s = scorer(&canonical, &contacts, &tdu, &rep_ids);

        let candidate = s.resolve_provider(
            "ComEd",
            None,
            "IL",
            UtilityType::Electric,
            "state_gis",
            Some("PJM"),
            Some("INVESTOR OWNED"),
        );
        assert!(!candidate.is_deregulated);
    }

    #[test]
    fn lubbock_is_deregulated_despite_being_municipal() {
        let canonical = CanonicalIndex::embedded().unwrap();
        let contacts = ContactTable::embedded();
        let tdu = TduPriority::embedded();
        let rep_ids: Vec<String> = Vec::new();
        let s = scorer(&canonical, &contacts, &tdu, &rep_ids);

        let candidate = s.resolve_provider(
            "City of Lubbock - (TX)",
            None,
            "TX",
            UtilityType::Electric,
            "state_gis",
            Some("ERCOT"),
            Some("MUNICIPAL"),
        );
        assert!(candidate.is_deregulated);
    }

    #[test]
    fn confidence_never_exceeds_the_ceiling() {
        let canonical = CanonicalIndex::embedded().unwrap();
        let contacts = ContactTable::embedded();
        let tdu = TduPriority::embedded();
        let rep_ids: Vec<String> = Vec::new();
        let s = scorer(&canonical, &contacts, &tdu, &rep_ids);

        let candidate = s.resolve_provider("ComEd", Some(1004), "IL", UtilityType::Electric, "state_gis", None, None);
        assert!(candidate.confidence <= MAX_CONFIDENCE);
    }
}
