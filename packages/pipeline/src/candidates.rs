//! Candidate collection: the P0-P6 source priority chain (§4.7.1).
//!
//! Every source that can say anything about this address/utility-type
//! combination runs, not just the first that hits — a correction
//! short-circuits the *primary slot* later on, but lower-priority sources
//! still contribute alternatives.

use utility_lookup_adapters::AdapterSet;
use utility_lookup_models::{CandidateProvider, UtilityType};
use utility_lookup_scorer::EnsembleScorer;
use utility_lookup_spatial::SpatialIndex;
use utility_lookup_state_gis::StateGisClient;

use crate::arbitration;
use crate::context::ResolveContext;

/// Water names lacking one of these keywords get rewritten to
/// `"City of {city}"` before scoring, since a bare personal/company name
/// on a water polygon is usually a mis-tagged municipal system.
const WATER_UTILITY_KEYWORDS: &[&str] = &[
    "water",
    "city of",
    "town of",
    "village of",
    "county",
    "municipal",
    "utility",
    "utilities",
    "district",
    "mud",
    "wsc",
    "sud",
    "pud",
    "wcid",
    "authority",
    "commission",
    "department",
    "dept",
    "service",
    "supply",
    "system",
    "works",
    "cooperative",
    "coop",
    "corp",
    "corporation",
    "improvement",
    "special",
    "rural",
];

fn looks_like_water_utility(name: &str) -> bool {
    let lower = name.to_lowercase();
    WATER_UTILITY_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn score(
    scorer: &EnsembleScorer<'_>,
    raw_name: &str,
    eia_id: Option<u32>,
    state: &str,
    utility_type: UtilityType,
    source: &str,
    control_area: Option<&str>,
    shape_type: Option<&str>,
    confidence_floor: Option<f64>,
) -> CandidateProvider {
    let mut candidate =
        scorer.resolve_provider(raw_name, eia_id, state, utility_type, source, control_area, shape_type);
    if let Some(floor) = confidence_floor {
        candidate.confidence = candidate.confidence.max(floor);
    }
    candidate
}

/// Runs the full P0-P6 chain for one utility type and returns every raw
/// candidate it produced, already passed through the Ensemble Scorer.
#[allow(clippy::too_many_arguments)]
pub async fn collect(
    adapters: &AdapterSet,
    state_gis: &StateGisClient,
    spatial: &SpatialIndex,
    scorer: &EnsembleScorer<'_>,
    ctx: &ResolveContext<'_>,
    utility_type: UtilityType,
) -> Vec<CandidateProvider> {
    let mut candidates = Vec::new();

    // P0: corrections, address then ZIP.
    if let Some(hit) = adapters.corrections.lookup_by_address(ctx.raw_address, utility_type) {
        candidates.push(score(
            scorer,
            &hit.name,
            None,
            ctx.state,
            utility_type,
            &hit.source,
            None,
            None,
            Some(hit.confidence),
        ));
    }
    if let Some(hit) = adapters.corrections.lookup_by_zip(ctx.zip, utility_type) {
        candidates.push(score(
            scorer,
            &hit.name,
            None,
            ctx.state,
            utility_type,
            &hit.source,
            None,
            None,
            Some(hit.confidence),
        ));
    }

    // P1: state GIS, boosted to >=0.90. Water names lacking a utility
    // keyword are rewritten to "City of {city}" or dropped.
    if state_gis.has_state_source(ctx.state, utility_type)
        && let Some(hit) = state_gis.query(ctx.lat, ctx.lon, ctx.state, utility_type).await
    {
        let name = if utility_type == UtilityType::Water && !looks_like_water_utility(&hit.name) {
            if ctx.city.is_empty() {
                None
            } else {
                Some(format!("City of {}", ctx.city))
            }
        } else {
            Some(hit.name.clone())
        };

        if let Some(name) = name {
            candidates.push(score(
                scorer,
                &name,
                None,
                ctx.state,
                utility_type,
                &format!("state_gis:{}", hit.source),
                None,
                None,
                Some(0.90),
            ));
        }
    }

    if utility_type == UtilityType::Gas {
        // P2: gas ZIP.
        if let Some(hit) = adapters.gas_zip.lookup(ctx.state, ctx.zip) {
            candidates.push(score(
                scorer, &hit.name, None, ctx.state, utility_type, &hit.source, None, None, None,
            ));
        }
        // P2.7: county gas.
        if let Some(hit) = adapters.county_gas.lookup(ctx.state, ctx.county, Some(ctx.city)) {
            candidates.push(score(
                scorer, &hit.name, None, ctx.state, utility_type, &hit.source, None, None, None,
            ));
        }
    }

    if utility_type == UtilityType::Electric && ctx.state.eq_ignore_ascii_case("GA") {
        // P2.5: Georgia EMC by county, may emit multiple candidates.
        for hit in adapters.georgia_emc.lookup(ctx.county) {
            candidates.push(score(
                scorer, &hit.name, None, ctx.state, utility_type, &hit.source, None, None, None,
            ));
        }
    }

    // P3: spatial index, with overlap arbitration.
    if matches!(
        utility_type,
        UtilityType::Electric | UtilityType::Gas | UtilityType::Water
    ) {
        let hits = spatial.query(utility_type, ctx.lon, ctx.lat);
        if let Some(winner) = arbitration::arbitrate(&hits, utility_type, ctx.state) {
            candidates.push(score(
                scorer,
                &winner.meta.name,
                winner.meta.eia_id,
                ctx.state,
                utility_type,
                &format!("spatial:{}", winner.meta.source),
                winner.meta.control_area.as_deref(),
                Some(winner.meta.shape_type.as_str()),
                None,
            ));
        }
    }

    // P3.5: remaining-states ZIP.
    if let Some(hit) = adapters.remaining_states_zip.lookup(ctx.state, ctx.zip, utility_type) {
        candidates.push(score(
            scorer, &hit.name, None, ctx.state, utility_type, &hit.source, None, None, None,
        ));
    }

    if utility_type == UtilityType::Water {
        // P3.7: special districts.
        if let Some(hit) = adapters.special_districts.lookup(ctx.zip) {
            candidates.push(score(
                scorer, &hit.name, None, ctx.state, utility_type, &hit.source, None, None, None,
            ));
        }
    }

    if utility_type == UtilityType::Electric {
        // P4: EIA ZIP.
        if let Some(hit) = adapters.eia_zip.lookup(ctx.zip) {
            candidates.push(score(
                scorer, &hit.name, None, ctx.state, utility_type, &hit.source, None, None, None,
            ));
        }
    }

    if matches!(utility_type, UtilityType::Electric | UtilityType::Gas) {
        // P5: FindEnergy city.
        if let Some(hit) = adapters.findenergy_city.lookup(ctx.state, ctx.city, utility_type) {
            candidates.push(score(
                scorer, &hit.name, None, ctx.state, utility_type, &hit.source, None, None, None,
            ));
        }
    }

    if utility_type == UtilityType::Gas {
        // P6: state gas default.
        if let Some(hit) = adapters.state_gas_default.lookup(ctx.state) {
            candidates.push(score(
                scorer, &hit.name, None, ctx.state, utility_type, &hit.source, None, None, None,
            ));
        }
    }

    candidates
}
