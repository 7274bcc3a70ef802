#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The resolution pipeline (C7): orchestrates candidate collection,
//! deduplication, overlap arbitration, primary selection, cross-
//! verification, and output assembly for one address/utility-type pair.

pub mod arbitration;
pub mod candidates;
pub mod context;
pub mod dedup;
pub mod iou;
pub mod sewer;
pub mod verify;

pub use context::ResolveContext;

use utility_lookup_adapters::AdapterSet;
use utility_lookup_id_matcher::ProviderIdMatcher;
use utility_lookup_models::{Alternative, CandidateProvider, ProviderResult, UtilityType};
use utility_lookup_normalizer::{CanonicalIndex, Normalizer};
use utility_lookup_scorer::{ContactTable, EnsembleScorer, TduPriority};
use utility_lookup_spatial::SpatialIndex;
use utility_lookup_state_gis::StateGisClient;

/// How many deduplicated runner-up candidates to surface as alternatives.
const MAX_ALTERNATIVES: usize = 4;

/// Every resource the pipeline needs, owned for the lifetime of the
/// process and shared read-only across concurrent lookups.
pub struct Pipeline {
    pub adapters: AdapterSet,
    pub state_gis: StateGisClient,
    pub spatial: SpatialIndex,
    pub canonical: CanonicalIndex,
    pub contacts: ContactTable,
    pub tdu: TduPriority,
    pub rep_ids: Vec<String>,
    pub id_matcher: ProviderIdMatcher,
}

impl Pipeline {
    fn scorer(&self) -> EnsembleScorer<'_> {
        EnsembleScorer::new(
            Normalizer::new(&self.canonical, &self.rep_ids),
            &self.canonical,
            &self.contacts,
            &self.tdu,
        )
    }

    /// Resolves one utility type for an address, running the full C7
    /// chain: collection, dedup/boost, primary selection with IOU
    /// demotion, EIA cross-verification (electric only), and output
    /// assembly (catalog id, contacts, alternatives).
    ///
    /// Sewer has no sources of its own and must be derived from an
    /// already-resolved water result via [`sewer::resolve`] instead.
    pub async fn resolve_utility_type(
        &self,
        ctx: &ResolveContext<'_>,
        utility_type: UtilityType,
    ) -> Option<ProviderResult> {
        let scorer = self.scorer();
        let raw = candidates::collect(
            &self.adapters,
            &self.state_gis,
            &self.spatial,
            &scorer,
            ctx,
            utility_type,
        )
        .await;

        self.finish(raw, ctx, utility_type)
    }

    /// Resolves the sewer result from an already-resolved water primary.
    #[must_use]
    pub fn resolve_sewer(&self, water_primary: Option<&CandidateProvider>, ctx: &ResolveContext<'_>) -> Option<ProviderResult> {
        let candidate = sewer::resolve(&self.id_matcher, water_primary, ctx.city, ctx.county, ctx.state)?;
        Some(self.assemble(candidate, Vec::new(), ctx.state))
    }

    fn finish(
        &self,
        raw: Vec<CandidateProvider>,
        ctx: &ResolveContext<'_>,
        utility_type: UtilityType,
    ) -> Option<ProviderResult> {
        let mut deduped = dedup::dedup_and_boost(raw);
        if deduped.is_empty() {
            return None;
        }

        let primary_idx = iou::select_primary(&deduped)?;
        let mut primary = deduped.remove(primary_idx);

        if utility_type == UtilityType::Electric
            && !matches!(primary.polygon_source.as_str(), s if s.starts_with("corrections") || s.starts_with("eia_zip"))
        {
            primary.confidence = verify::apply(&self.adapters.eia_zip, ctx.zip, &primary.display_name, primary.confidence);
        }

        Some(self.assemble(primary, deduped, ctx.state))
    }

    fn assemble(&self, primary: CandidateProvider, alternatives: Vec<CandidateProvider>, state: &str) -> ProviderResult {
        let catalog_match = self.id_matcher.match_provider(&primary.display_name, primary.utility_type, Some(state));

        let (phone, website) = primary
            .canonical_id
            .as_deref()
            .map_or((None, None), |id| self.scorer().contacts_for(id, primary.utility_type));

        let alt_limit: Vec<Alternative> = alternatives
            .into_iter()
            .filter(|a| a.display_name != primary.display_name)
            .take(MAX_ALTERNATIVES)
            .map(|a| {
                let catalog = self.id_matcher.match_provider(&a.display_name, a.utility_type, Some(state));
                Alternative {
                    provider: a.display_name,
                    confidence: a.confidence,
                    source: a.polygon_source,
                    eia_id: a.eia_id,
                    catalog_id: catalog.as_ref().map(|c| c.id),
                    catalog_title: catalog.map(|c| c.title),
                }
            })
            .collect();

        ProviderResult {
            provider_name: primary.display_name,
            canonical_id: primary.canonical_id,
            eia_id: primary.eia_id,
            utility_type: primary.utility_type,
            confidence: primary.confidence,
            match_method: primary.match_method,
            is_deregulated: primary.is_deregulated,
            deregulated_note: primary.deregulated_note,
            polygon_source: primary.polygon_source,
            needs_review: false,
            alternatives: alt_limit,
            catalog_id: catalog_match.as_ref().map(|c| c.id),
            catalog_title: catalog_match.as_ref().map(|c| c.title.clone()),
            id_match_score: catalog_match.as_ref().map_or(0, |c| c.match_score),
            id_confident: catalog_match.is_some_and(|c| c.confident),
            phone,
            website,
        }
        .recompute_needs_review()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_geojson(min: f64, max: f64) -> String {
        format!(
            r#"{{"type":"Polygon","coordinates":[[[{min},{min}],[{max},{min}],[{max},{max}],[{min},{max}],[{min},{min}]]]}}"#
        )
    }

    fn pipeline_with_one_electric_territory() -> (Pipeline, duckdb::Connection) {
        let conn = duckdb::Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE electric_territories (
                name TEXT, state TEXT, shape_type TEXT, area_km2 DOUBLE, customers BIGINT,
                eia_id BIGINT, control_area TEXT, pwsid TEXT, holding_company TEXT,
                source TEXT, geojson TEXT
            );
            CREATE TABLE gas_territories (
                name TEXT, state TEXT, shape_type TEXT, area_km2 DOUBLE, customers BIGINT,
                eia_id BIGINT, control_area TEXT, pwsid TEXT, holding_company TEXT,
                source TEXT, geojson TEXT
            );
            CREATE TABLE water_territories (
                name TEXT, state TEXT, shape_type TEXT, area_km2 DOUBLE, customers BIGINT,
                eia_id BIGINT, control_area TEXT, pwsid TEXT, holding_company TEXT,
                source TEXT, geojson TEXT
            );",
        )
        .unwrap();

        conn.execute(
            "INSERT INTO electric_territories VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            duckdb::params![
                "ComEd",
                "IL",
                "INVESTOR OWNED",
                1000.0,
                4_000_000_i64,
                1004_i64,
                "PJM",
                Option::<String>::None,
                "Exelon",
                "hifld",
                square_geojson(-88.0, -87.0),
            ],
        )
        .unwrap();

        let spatial = SpatialIndex::load(&conn).unwrap();
        let pipeline = Pipeline {
            adapters: AdapterSet::embedded(Vec::new()),
            state_gis: StateGisClient::with_embedded_registry(),
            spatial,
            canonical: CanonicalIndex::embedded().unwrap(),
            contacts: ContactTable::embedded(),
            tdu: TduPriority::embedded(),
            rep_ids: utility_lookup_normalizer::embedded_rep_ids().unwrap(),
            id_matcher: ProviderIdMatcher::embedded(Vec::new()),
        };
        (pipeline, conn)
    }

    #[tokio::test]
    async fn resolves_electric_primary_from_spatial_index() {
        let (pipeline, _conn) = pipeline_with_one_electric_territory();
        // lat/lon both land inside the test polygon's synthetic [-88,-87] box.
        let ctx = ResolveContext {
            raw_address: "1 N State St, Chicago, IL",
            lat: -87.5,
            lon: -87.5,
            state: "IL",
            zip: "60601",
            city: "Chicago",
            county: "Cook",
        };
        let result = pipeline.resolve_utility_type(&ctx, UtilityType::Electric).await.unwrap();
        assert_eq!(result.provider_name, "ComEd");
        assert_eq!(result.canonical_id.as_deref(), Some("comed"));
    }
}
