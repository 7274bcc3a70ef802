//! Owns every resource a lookup needs and exposes the one operation the
//! HTTP layer cares about: resolve an address into a [`LookupResult`].
//!
//! Construction (`Engine::load`) does the embedded-table parsing and
//! `DuckDB` connection opening the pipeline's tests stub out; it is
//! deliberately synchronous and run on a blocking thread at startup
//! (see [`crate::spawn_engine_loader`]) so it never stalls the async
//! runtime that serves `/health` in the meantime.

use std::sync::Mutex;
use std::time::Instant;

use duckdb::Connection;
use utility_lookup_adapters::AdapterSet;
use utility_lookup_cache::ResultCache;
use utility_lookup_database::{corrections_db, geocode_cache, result_cache};
use utility_lookup_geocoder::GeocoderConfig;
use utility_lookup_id_matcher::ProviderIdMatcher;
use utility_lookup_internet::InternetClient;
use utility_lookup_models::{CandidateProvider, LookupResult, MatchMethod, ProviderResult, UtilityType};
use utility_lookup_normalizer::{CanonicalIndex, embedded_rep_ids};
use utility_lookup_pipeline::{Pipeline, ResolveContext};
use utility_lookup_scorer::{ContactTable, TduPriority};
use utility_lookup_spatial::SpatialIndex;
use utility_lookup_state_gis::StateGisClient;

use crate::error::EngineError;

const GEOCODE_PROVIDER: &str = "census";

/// Everything the resolution pipeline needs, plus the caches and HTTP
/// client that sit in front of it. Shared read-only across requests via
/// `Arc`; the `DuckDB` connections are process-local and not `Sync`, so
/// each sits behind its own `Mutex`.
pub struct Engine {
    pipeline: Pipeline,
    geocoder_client: reqwest::Client,
    geocoder_config: GeocoderConfig,
    cache: ResultCache,
    cache_conn: Mutex<Connection>,
    geocode_conn: Mutex<Connection>,
    internet: InternetClient,
    skip_water: bool,
    loaded_at: Instant,
}

impl Engine {
    /// Loads every embedded table and opens the `DuckDB` connections the
    /// pipeline and caches need. Blocking; run on a dedicated thread.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if any embedded table fails to parse or
    /// any `DuckDB` connection fails to open.
    pub fn load() -> Result<Self, EngineError> {
        log::info!("loading resolution engine");

        let corrections_conn = corrections_db::open_default()?;
        let corrections = corrections_db::load_corrections(&corrections_conn)?;
        let id_mappings = corrections_db::load_id_mappings(&corrections_conn)?;

        let territories_conn = utility_lookup_database::territories_db::open_default()?;
        let spatial = SpatialIndex::load(&territories_conn).map_err(|e| EngineError::Spatial(e.to_string()))?;

        let pipeline = Pipeline {
            adapters: AdapterSet::embedded(corrections),
            state_gis: StateGisClient::with_embedded_registry(),
            spatial,
            canonical: CanonicalIndex::embedded()?,
            contacts: ContactTable::embedded(),
            tdu: TduPriority::embedded(),
            rep_ids: embedded_rep_ids()?,
            id_matcher: ProviderIdMatcher::embedded(id_mappings),
        };

        let skip_water = std::env::var("SKIP_WATER").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        log::info!("resolution engine loaded (skip_water={skip_water})");

        Ok(Self {
            pipeline,
            geocoder_client: reqwest::Client::builder().timeout(std::time::Duration::from_secs(10)).build()?,
            geocoder_config: GeocoderConfig::default(),
            cache: ResultCache::default(),
            cache_conn: Mutex::new(result_cache::open_default()?),
            geocode_conn: Mutex::new(geocode_cache::open_default()?),
            internet: InternetClient::connect_from_env(),
            skip_water,
            loaded_at: Instant::now(),
        })
    }

    /// Resolves one address end to end: cache check, geocode, candidate
    /// collection for every utility type, sewer inheritance.
    pub async fn lookup(&self, address: &str, no_cache: bool) -> LookupResult {
        let start = Instant::now();

        if !no_cache
            && let Ok(conn) = self.cache_conn.lock()
            && let Ok(Some(cached)) = self.cache.get(&conn, address)
        {
            return cached;
        }

        let Some(ctx) = self.geocode(address).await else {
            return LookupResult::unresolved(address.to_string(), elapsed_ms(start));
        };

        let resolve_ctx = ctx.as_resolve_ctx();
        let electric = self.pipeline.resolve_utility_type(&resolve_ctx, UtilityType::Electric).await;
        let gas = self.pipeline.resolve_utility_type(&resolve_ctx, UtilityType::Gas).await;
        let water = if self.skip_water {
            None
        } else {
            self.pipeline.resolve_utility_type(&resolve_ctx, UtilityType::Water).await
        };
        let water_candidate = water.as_ref().map(|w| as_candidate(w, &ctx.state));
        let sewer = self.pipeline.resolve_sewer(water_candidate.as_ref(), &resolve_ctx);
        let internet = self.internet.lookup(&ctx.block_geoid).await;

        let result = LookupResult {
            address: address.to_string(),
            lat: ctx.lat,
            lon: ctx.lon,
            geocode_confidence: ctx.geocode_confidence,
            electric,
            gas,
            water,
            sewer,
            trash: None,
            internet,
            lookup_time_ms: elapsed_ms(start),
            timestamp: chrono::Utc::now(),
        };

        if let Ok(conn) = self.cache_conn.lock() {
            let _ = self.cache.put(&conn, address, &result);
        }

        result
    }

    /// Clears every cached result.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the cache connection cannot be locked
    /// or the delete fails.
    pub fn clear_cache(&self) -> Result<u64, EngineError> {
        let conn = self.cache_conn.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        result_cache::clear(&conn).map_err(EngineError::from)
    }

    async fn geocode(&self, address: &str) -> Option<GeocodedContext> {
        let key = utility_lookup_cache::normalize_address(address);

        if let Ok(conn) = self.geocode_conn.lock()
            && let Ok((hits, _tried)) = geocode_cache::cache_lookup(&conn, std::slice::from_ref(&key))
            && let Some(cached) = hits.get(&key)
            && has_components(cached)
        {
            return Some(GeocodedContext {
                raw_address: address.to_string(),
                lat: cached.lat,
                lon: cached.lon,
                geocode_confidence: 1.0,
                state: cached.state.clone().unwrap_or_default(),
                zip: cached.zip.clone().unwrap_or_default(),
                city: cached.city.clone().unwrap_or_default(),
                county: cached.county.clone().unwrap_or_default(),
                block_geoid: cached.block_geoid.clone().unwrap_or_default(),
            });
        }

        let geocoded = utility_lookup_geocoder::census::geocode_oneline(&self.geocoder_client, &self.geocoder_config, address)
            .await
            .ok()
            .flatten()?;

        if let Ok(conn) = self.geocode_conn.lock() {
            let entry = (
                key,
                GEOCODE_PROVIDER.to_string(),
                Some(geocoded.lat),
                Some(geocoded.lon),
                geocoded.formatted_address.clone(),
                geocoded.city.clone(),
                geocoded.state.clone(),
                geocoded.zip.clone(),
                geocoded.county.clone(),
                geocoded.block_geoid.clone(),
            );
            let _ = geocode_cache::cache_insert(&conn, &[entry]);
        }

        Some(GeocodedContext {
            raw_address: address.to_string(),
            lat: geocoded.lat,
            lon: geocoded.lon,
            geocode_confidence: geocoded.confidence,
            state: geocoded.state.unwrap_or_default(),
            zip: geocoded.zip.unwrap_or_default(),
            city: geocoded.city.unwrap_or_default(),
            county: geocoded.county.unwrap_or_default(),
            block_geoid: geocoded.block_geoid.unwrap_or_default(),
        })
    }
}

/// A cache hit is only usable if it was written after components were
/// tracked; a row cached before that (or a deliberate failed-geocode
/// miss row) has every component `None` and must fall through to a
/// fresh geocode rather than silently resolving with blanks.
fn has_components(cached: &geocode_cache::CachedGeocode) -> bool {
    cached.state.is_some() || cached.zip.is_some() || cached.city.is_some() || cached.county.is_some() || cached.block_geoid.is_some()
}

/// A geocoded address plus its confidence, owned so it can be held
/// across the `.await` points of a multi-step lookup (electric, gas,
/// water, sewer) without borrowing from a temporary.
struct GeocodedContext {
    raw_address: String,
    lat: f64,
    lon: f64,
    geocode_confidence: f64,
    state: String,
    zip: String,
    city: String,
    county: String,
    /// 15-character Census block `GeoID`, used only by the internet
    /// source. Empty when the geocoder couldn't resolve one.
    block_geoid: String,
}

impl GeocodedContext {
    fn as_resolve_ctx(&self) -> ResolveContext<'_> {
        ResolveContext {
            raw_address: &self.raw_address,
            lat: self.lat,
            lon: self.lon,
            state: &self.state,
            zip: &self.zip,
            city: &self.city,
            county: &self.county,
        }
    }
}

/// Rebuilds a [`CandidateProvider`] from an already-assembled water
/// [`ProviderResult`] so [`Pipeline::resolve_sewer`] can run its
/// water-inheritance check. The pipeline only returns the assembled
/// result, not the pre-assembly candidate, so this glue lives here
/// rather than in `utility_lookup_pipeline`.
fn as_candidate(water: &ProviderResult, state: &str) -> CandidateProvider {
    CandidateProvider {
        raw_name: water.provider_name.clone(),
        canonical_id: water.canonical_id.clone(),
        display_name: water.provider_name.clone(),
        eia_id: water.eia_id,
        utility_type: UtilityType::Water,
        confidence: water.confidence,
        match_method: MatchMethod::Exact,
        polygon_source: water.polygon_source.clone(),
        state: state.to_string(),
        is_deregulated: water.is_deregulated,
        deregulated_note: water.deregulated_note.clone(),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
