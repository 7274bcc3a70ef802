//! HTTP handler functions for the utility lookup API.

use actix_web::{HttpRequest, HttpResponse, web};
use futures::stream;
use utility_lookup_server_models::{
    BatchAddressResult, BatchLookupRequest, BatchLookupResponse, CacheClearedResponse, ErrorResponse, HealthResponse, LookupQuery,
    MAX_BATCH_SIZE,
};

use crate::AppState;
use crate::engine::Engine;

/// `GET /health`. Never authenticated.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let engine_loaded = state.engine.get().is_some();
    HttpResponse::Ok().json(HealthResponse {
        status: if engine_loaded { "ok" } else { "loading" }.to_string(),
        engine_loaded,
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

fn authorize(req: &HttpRequest, state: &AppState) -> Result<(), HttpResponse> {
    if !state.auth_enabled() {
        return Ok(());
    }

    let header_key = req.headers().get("X-API-Key").and_then(|v| v.to_str().ok());

    let query_key = web::Query::<LookupQuery>::from_query(req.query_string()).ok().and_then(|q| q.api_key.clone());

    let presented = header_key.map(str::to_string).or(query_key);

    match presented {
        Some(key) if state.key_is_valid(&key) => Ok(()),
        _ => Err(HttpResponse::Unauthorized().json(ErrorResponse::new("missing or invalid API key"))),
    }
}

fn engine_or_unavailable(state: &AppState) -> Result<&Engine, HttpResponse> {
    state
        .engine
        .get()
        .ok_or_else(|| HttpResponse::ServiceUnavailable().json(ErrorResponse::new("engine still loading")))
}

/// `GET/POST /lookup?address=...&no_cache=0|1`
pub async fn lookup(req: HttpRequest, state: web::Data<AppState>, query: web::Query<LookupQuery>) -> HttpResponse {
    if let Err(resp) = authorize(&req, &state) {
        return resp;
    }
    let engine = match engine_or_unavailable(&state) {
        Ok(e) => e,
        Err(resp) => return resp,
    };

    let result = engine.lookup(&query.address, query.no_cache).await;
    HttpResponse::Ok().json(result)
}

/// `POST /lookup/batch` body `{addresses: [...]}` (max 100).
pub async fn lookup_batch(req: HttpRequest, state: web::Data<AppState>, body: web::Json<BatchLookupRequest>) -> HttpResponse {
    if let Err(resp) = authorize(&req, &state) {
        return resp;
    }
    let engine = match engine_or_unavailable(&state) {
        Ok(e) => e,
        Err(resp) => return resp,
    };

    if body.addresses.len() > MAX_BATCH_SIZE {
        return HttpResponse::BadRequest().json(ErrorResponse::new(format!("batch exceeds the {MAX_BATCH_SIZE}-address limit")));
    }

    let start = std::time::Instant::now();
    let mut results = Vec::with_capacity(body.addresses.len());
    for address in &body.addresses {
        results.push(BatchAddressResult {
            address: address.clone(),
            result: Some(engine.lookup(address, false).await),
            error: None,
        });
    }

    HttpResponse::Ok().json(BatchLookupResponse {
        total: results.len(),
        results,
        lookup_time_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
    })
}

/// `DELETE /cache`. Auth required.
pub async fn clear_cache(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Err(resp) = authorize(&req, &state) {
        return resp;
    }
    let engine = match engine_or_unavailable(&state) {
        Ok(e) => e,
        Err(resp) => return resp,
    };

    match engine.clear_cache() {
        Ok(cleared) => HttpResponse::Ok().json(CacheClearedResponse { cleared }),
        Err(e) => HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string())),
    }
}

/// `GET /api/lookup/stream`. Emits one SSE event per utility type, then a
/// final `complete` event, as each resolution step finishes.
pub async fn lookup_stream(req: HttpRequest, state: web::Data<AppState>, query: web::Query<LookupQuery>) -> HttpResponse {
    if let Err(resp) = authorize(&req, &state) {
        return resp;
    }
    if engine_or_unavailable(&state).is_err() {
        return HttpResponse::ServiceUnavailable().json(ErrorResponse::new("engine still loading"));
    }

    let address = query.address.clone();
    let no_cache = query.no_cache;
    let state = state.into_inner();

    let events = stream::unfold(Some((state, address, no_cache)), |pending| async move {
        let (state, address, no_cache) = pending?;
        let Some(engine) = state.engine.get() else {
            return None;
        };

        let result = engine.lookup(&address, no_cache).await;
        let mut body = String::new();
        for (event, value) in [
            ("electric", serde_json::to_value(&result.electric)),
            ("gas", serde_json::to_value(&result.gas)),
            ("water", serde_json::to_value(&result.water)),
            ("sewer", serde_json::to_value(&result.sewer)),
        ] {
            if let Ok(json) = value {
                body.push_str(&format!("event: {event}\ndata: {json}\n\n"));
            }
        }
        body.push_str("event: complete\ndata: {}\n\n");

        Some((Ok::<_, actix_web::Error>(web::Bytes::from(body)), None))
    });

    HttpResponse::Ok().content_type("text/event-stream").streaming(events)
}
