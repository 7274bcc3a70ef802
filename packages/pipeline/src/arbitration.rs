//! Overlap arbitration among spatial-index hits for the same point
//! (§4.7.3). [`utility_lookup_spatial::SpatialIndex::query`] already
//! returns hits sorted by non-decreasing polygon area, which several of
//! these rules lean on directly.

use utility_lookup_models::UtilityType;
use utility_lookup_spatial::TerritoryHit;

/// Curated large investor-owned utilities. Their territory scores are
/// halved in the non-Texas electric arbiter so a co-op or municipal
/// utility sharing the same footprint wins on comparable customer
/// counts.
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

/// Texas TDU priority, checked after the co-op/municipal carve-out.
const TEXAS_TDU_PRIORITY: &[&str] = &[
    "CenterPoint Energy",
    "AEP Texas Central Company",
    "AEP Texas North Company",
    "Oncor Electric Delivery Company LLC",
    "Texas-New Mexico Power Co",
    "City of Lubbock",
];

fn is_coop_or_municipal(hit: &TerritoryHit) -> bool {
    hit.meta.shape_type.eq_ignore_ascii_case("COOPERATIVE") || hit.meta.shape_type.eq_ignore_ascii_case("MUNICIPAL")
}

fn texas_tdu_rank(name: &str) -> Option<usize> {
    TEXAS_TDU_PRIORITY.iter().position(|tdu| name.contains(tdu))
}

/// Picks the winning territory among overlapping polygons for one point.
#[must_use]
pub fn arbitrate(hits: &[TerritoryHit], utility_type: UtilityType, state: &str) -> Option<TerritoryHit> {
    if hits.is_empty() {
        return None;
    }

    match utility_type {
        // Already sorted by ascending area: nested inclusion means the
        // smallest containing polygon is the most specific one.
        UtilityType::Water => Some(hits[0].clone()),
        UtilityType::Gas => arbitrate_gas(hits, state),
        UtilityType::Electric if state.eq_ignore_ascii_case("TX") => arbitrate_texas_electric(hits),
        UtilityType::Electric => arbitrate_electric(hits),
        UtilityType::Sewer | UtilityType::Trash | UtilityType::Internet => Some(hits[0].clone()),
    }
}

fn arbitrate_gas(hits: &[TerritoryHit], state: &str) -> Option<TerritoryHit> {
    hits.iter()
        .min_by(|a, b| {
            let a_same = !a.meta.state.eq_ignore_ascii_case(state);
            let b_same = !b.meta.state.eq_ignore_ascii_case(state);
            a_same
                .cmp(&b_same)
                .then_with(|| a.meta.area_km2.partial_cmp(&b.meta.area_km2).unwrap_or(std::cmp::Ordering::Equal))
        })
        .cloned()
}

fn arbitrate_texas_electric(hits: &[TerritoryHit]) -> Option<TerritoryHit> {
    if let Some(hit) = hits.iter().find(|h| is_coop_or_municipal(h) && h.meta.area_km2 < 5_000.0) {
        return Some(hit.clone());
    }

    hits.iter()
        .filter_map(|h| texas_tdu_rank(&h.meta.name).map(|rank| (rank, h)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, h)| h.clone())
        .or_else(|| hits.first().cloned())
}

fn electric_score(hit: &TerritoryHit) -> f64 {
    let mut score = hit.meta.customers.unwrap_or(0) as f64;

    if LARGE_IOUS.iter().any(|n| hit.meta.name.eq_ignore_ascii_case(n)) {
        score *= 0.5;
    }

    if hit.meta.area_km2 > 50_000.0 {
        score *= 0.1;
        if hit.meta.area_km2 > 20_000.0 && hit.meta.customers.unwrap_or(0) < 10_000 {
            score *= 0.3;
        }
    }

    if hit.meta.shape_type.eq_ignore_ascii_case("POLITICAL")
        && hit.meta.customers.is_some_and(|c| c > 0 && c < 100)
    {
        score *= 0.1;
    }

    score
}

fn arbitrate_electric(hits: &[TerritoryHit]) -> Option<TerritoryHit> {
    if let Some(hit) = hits.iter().find(|h| is_coop_or_municipal(h) && h.meta.area_km2 < 5_000.0) {
        return Some(hit.clone());
    }

    hits.iter()
        .max_by(|a, b| electric_score(a).partial_cmp(&electric_score(b)).unwrap_or(std::cmp::Ordering::Equal))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use utility_lookup_models::TerritoryPolygon;

    fn hit(name: &str, state: &str, shape_type: &str, area_km2: f64, customers: Option<u64>) -> TerritoryHit {
        TerritoryHit {
            meta: TerritoryPolygon {
                name: name.to_string(),
                state: state.to_string(),
                shape_type: shape_type.to_string(),
                area_km2,
                customers,
                eia_id: None,
                control_area: None,
                pwsid: None,
                holding_company: None,
                source: "hifld".to_string(),
            },
        }
    }

    #[test]
    fn water_arbitration_picks_smallest_nested_polygon() {
        let hits = vec![
            hit("County Water", "TX", "MUNICIPAL", 500.0, None),
            hit("City of Austin Water", "TX", "MUNICIPAL", 50.0, None),
        ];
        let winner = arbitrate(&hits, UtilityType::Water, "TX").unwrap();
        assert_eq!(winner.meta.name, "City of Austin Water");
    }

    #[test]
    fn gas_arbitration_prefers_same_state() {
        let hits = vec![
            hit("Cross State Gas", "OK", "INVESTOR OWNED", 10.0, None),
            hit("Local Gas", "TX", "INVESTOR OWNED", 50.0, None),
        ];
        let winner = arbitrate(&hits, UtilityType::Gas, "TX").unwrap();
        assert_eq!(winner.meta.name, "Local Gas");
    }

    #[test]
    fn texas_electric_coop_beats_tdu_when_small() {
        let hits = vec![
            hit("Oncor Electric Delivery Company LLC", "TX", "INVESTOR OWNED", 40_000.0, Some(3_000_000)),
            hit("Pedernales Electric Cooperative", "TX", "COOPERATIVE", 1_200.0, Some(300_000)),
        ];
        let winner = arbitrate(&hits, UtilityType::Electric, "TX").unwrap();
        assert_eq!(winner.meta.name, "Pedernales Electric Cooperative");
    }

    #[test]
    fn texas_electric_falls_back_to_tdu_priority() {
        let hits = vec![
            hit("Oncor Electric Delivery Company LLC", "TX", "INVESTOR OWNED", 40_000.0, Some(3_000_000)),
            hit("CenterPoint Energy", "TX", "INVESTOR OWNED", 20_000.0, Some(2_500_000)),
        ];
        let winner = arbitrate(&hits, UtilityType::Electric, "TX").unwrap();
        assert_eq!(winner.meta.name, "CenterPoint Energy");
    }

    #[test]
    fn federal_wholesale_entity_is_penalized() {
        let hits = vec![
            hit("Rural Electric Cooperative", "MT", "COOPERATIVE", 8_000.0, Some(40_000)),
            hit("Bonneville Power Administration", "MT", "POLITICAL", 60_000.0, Some(5_000)),
        ];
        let winner = arbitrate(&hits, UtilityType::Electric, "MT").unwrap();
        assert_eq!(winner.meta.name, "Rural Electric Cooperative");
    }
}
