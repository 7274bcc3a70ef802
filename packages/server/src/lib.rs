#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web HTTP API for the utility provider resolution engine.
//!
//! Loading the engine (parsing the embedded canonical/catalog/contact
//! tables, opening the territory and cache `DuckDB` files) takes up to
//! ~90 seconds per the spatial index's own startup budget. The server
//! binds and starts answering `GET /health` immediately; every other
//! route returns `503` with a `Retry-After` hint until the background
//! loader finishes, mirroring the teacher's `OnceLock`-backed data
//! watcher in spirit (poll a lock, degrade gracefully) though here the
//! engine only ever needs to load once, not re-poll for refreshed files.

pub mod engine;
mod error;
mod handlers;

pub use error::EngineError;

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};

use engine::Engine;

/// Shared application state.
pub struct AppState {
    /// Set once by the background loader; `None` until then.
    pub engine: Arc<OnceLock<Engine>>,
    pub started_at: Instant,
    /// API keys accepted by `X-API-Key`/`api_key`. Empty disables auth.
    pub api_keys: Vec<String>,
}

impl AppState {
    #[must_use]
    pub fn auth_enabled(&self) -> bool {
        !self.api_keys.is_empty()
    }

    #[must_use]
    pub fn key_is_valid(&self, key: &str) -> bool {
        self.api_keys.iter().any(|k| k == key)
    }
}

/// Parses `UTILITY_API_KEYS` (comma-separated) into the key list the
/// server authenticates `/lookup` and `/cache` requests against.
#[must_use]
pub fn api_keys_from_env() -> Vec<String> {
    std::env::var("UTILITY_API_KEYS")
        .ok()
        .map(|raw| raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Spawns the blocking engine load on a dedicated thread and publishes
/// the result into `engine_lock` when it finishes.
pub fn spawn_engine_loader(engine_lock: Arc<OnceLock<Engine>>) {
    tokio::task::spawn_blocking(move || match Engine::load() {
        Ok(engine) => {
            if engine_lock.set(engine).is_err() {
                log::warn!("engine already loaded (race condition)");
            } else {
                log::info!("engine ready");
            }
        }
        Err(e) => {
            log::error!("failed to load resolution engine: {e}");
        }
    });
}

/// Starts the utility lookup API server.
///
/// # Errors
///
/// Returns an I/O error if the HTTP server fails to bind or encounters a
/// runtime error.
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let api_keys = api_keys_from_env();
    if api_keys.is_empty() {
        log::warn!("UTILITY_API_KEYS not set; /lookup and /cache are unauthenticated");
    }

    let engine_lock: Arc<OnceLock<Engine>> = Arc::new(OnceLock::new());
    spawn_engine_loader(Arc::clone(&engine_lock));

    let state = web::Data::new(AppState {
        engine: engine_lock,
        started_at: Instant::now(),
        api_keys,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8080);

    log::info!("starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .route("/health", web::get().to(handlers::health))
            .route("/lookup", web::get().to(handlers::lookup))
            .route("/lookup", web::post().to(handlers::lookup))
            .route("/lookup/batch", web::post().to(handlers::lookup_batch))
            .route("/cache", web::delete().to(handlers::clear_cache))
            .service(web::scope("/api").route("/lookup/stream", web::get().to(handlers::lookup_stream)))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
