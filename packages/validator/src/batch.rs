//! Batch comparison over a tenant ground-truth CSV.
//!
//! This is the simpler sequential variant suitable for CLI use: one
//! address at a time, in input order. The worker-pool fan-out variant
//! (bulk geocode, then fanned spatial lookup) lives in the ambient
//! batch-mode entry point, not here — this module only classifies
//! already-resolved pairs.

use utility_lookup_models::{LookupResult, UtilityType};
use utility_lookup_normalizer::CanonicalIndex;

use crate::{Category, ComparisonResult, compare};

/// One row of tenant-reported ground truth, keyed by address.
#[derive(Debug, Clone, Default)]
pub struct TenantRecord {
    pub address: String,
    pub state: String,
    pub electric: String,
    pub gas: String,
    pub water: String,
    pub sewer: String,
}

/// The per-utility-type comparison outcomes for one address.
#[derive(Debug, Clone)]
pub struct BatchRow {
    pub address: String,
    pub electric: Option<ComparisonResult>,
    pub gas: Option<ComparisonResult>,
    pub water: Option<ComparisonResult>,
    pub sewer: Option<ComparisonResult>,
}

/// Compares one engine [`LookupResult`] against one [`TenantRecord`],
/// producing a classification for every utility type the tenant record
/// carries ground truth for.
#[must_use]
pub fn validate_row(index: &CanonicalIndex, rep_ids: &[String], engine: &LookupResult, tenant: &TenantRecord) -> BatchRow {
    let classify = |utility_type: UtilityType, engine_result: Option<&str>, tenant_raw: &str| {
        compare(index, rep_ids, engine_result, tenant_raw, utility_type, &tenant.state, &[])
    };

    BatchRow {
        address: tenant.address.clone(),
        electric: Some(classify(
            UtilityType::Electric,
            engine.electric.as_ref().map(|p| p.provider_name.as_str()),
            &tenant.electric,
        )),
        gas: Some(classify(UtilityType::Gas, engine.gas.as_ref().map(|p| p.provider_name.as_str()), &tenant.gas)),
        water: Some(classify(UtilityType::Water, engine.water.as_ref().map(|p| p.provider_name.as_str()), &tenant.water)),
        sewer: Some(classify(UtilityType::Sewer, engine.sewer.as_ref().map(|p| p.provider_name.as_str()), &tenant.sewer)),
    }
}

/// Compares a batch of engine results against tenant records in order.
/// `engine_results` and `tenant_records` must be the same length and
/// index-aligned (both already sorted to match the input address list);
/// output preserves that order.
#[must_use]
pub fn validate_batch(index: &CanonicalIndex, rep_ids: &[String], engine_results: &[LookupResult], tenant_records: &[TenantRecord]) -> Vec<BatchRow> {
    engine_results
        .iter()
        .zip(tenant_records)
        .map(|(engine, tenant)| validate_row(index, rep_ids, engine, tenant))
        .collect()
}

/// Tallies categories across a batch, for a summary report.
#[must_use]
pub fn tally(rows: &[BatchRow]) -> std::collections::BTreeMap<Category, u32> {
    let mut counts = std::collections::BTreeMap::new();
    for row in rows {
        for result in [&row.electric, &row.gas, &row.water, &row.sewer].into_iter().flatten() {
            *counts.entry(result.category).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn engine_result(provider: &str) -> LookupResult {
        LookupResult {
            address: "233 S Wacker Dr".to_string(),
            lat: 41.8,
            lon: -87.6,
            geocode_confidence: 0.9,
            electric: Some(utility_lookup_models::ProviderResult {
                provider_name: provider.to_string(),
                canonical_id: None,
                eia_id: None,
                utility_type: UtilityType::Electric,
                confidence: 0.9,
                match_method: utility_lookup_models::MatchMethod::Exact,
                is_deregulated: false,
                deregulated_note: None,
                polygon_source: "state_gis".to_string(),
                needs_review: false,
                alternatives: Vec::new(),
                catalog_id: None,
                catalog_title: None,
                id_match_score: 0,
                id_confident: false,
                phone: None,
                website: None,
            }),
            gas: None,
            water: None,
            sewer: None,
            trash: None,
            internet: None,
            lookup_time_ms: 5,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn validate_row_classifies_each_utility_type_independently() {
        let index = CanonicalIndex::embedded().unwrap();
        let reps = utility_lookup_normalizer::embedded_rep_ids().unwrap();

        let engine = engine_result("ComEd");
        let tenant = TenantRecord {
            address: "233 S Wacker Dr".to_string(),
            state: "IL".to_string(),
            electric: "Commonwealth Edison".to_string(),
            gas: String::new(),
            water: String::new(),
            sewer: String::new(),
        };

        let row = validate_row(&index, &reps, &engine, &tenant);
        assert_eq!(row.electric.unwrap().category, Category::Match);
        assert_eq!(row.gas.unwrap().category, Category::BothEmpty);
    }

    #[test]
    fn validate_batch_preserves_input_order() {
        let index = CanonicalIndex::embedded().unwrap();
        let reps = utility_lookup_normalizer::embedded_rep_ids().unwrap();

        let engines = vec![engine_result("ComEd"), engine_result("Duke Energy")];
        let tenants = vec![
            TenantRecord {
                address: "first".to_string(),
                state: "IL".to_string(),
                electric: "Commonwealth Edison".to_string(),
                ..Default::default()
            },
            TenantRecord {
                address: "second".to_string(),
                state: "NC".to_string(),
                electric: "Duke Energy Carolinas".to_string(),
                ..Default::default()
            },
        ];

        let rows = validate_batch(&index, &reps, &engines, &tenants);
        assert_eq!(rows[0].address, "first");
        assert_eq!(rows[1].address, "second");
    }

    #[test]
    fn tally_counts_categories_across_every_utility_type() {
        let index = CanonicalIndex::embedded().unwrap();
        let reps = utility_lookup_normalizer::embedded_rep_ids().unwrap();

        let engine = engine_result("ComEd");
        let tenant = TenantRecord {
            address: "233 S Wacker Dr".to_string(),
            state: "IL".to_string(),
            electric: "Commonwealth Edison".to_string(),
            ..Default::default()
        };

        let rows = vec![validate_row(&index, &reps, &engine, &tenant)];
        let counts = tally(&rows);
        assert_eq!(counts.get(&Category::Match), Some(&1));
        assert_eq!(counts.get(&Category::BothEmpty), Some(&3));
    }
}
