use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::{body::Bytes, routing::{get, post}, Json, Router};
use contentrec_core::{respond, RecommenderConfig, Response};
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub item_id: i64,
    pub items: Value,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub explain: bool,
}

/// Request bodies carry the whole item catalogue, so the limit sits well above axum's 2 MB default.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Only immutable defaults live here; every request builds its own corpus.
#[derive(Clone, Default)]
pub struct AppState {
    pub defaults: RecommenderConfig,
}

pub fn build_app(defaults: RecommenderConfig, max_body_bytes: usize) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/recommendations", post(recommend_handler))
        .with_state(AppState { defaults })
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Always answers 200; failures are reported in the `error` key of the body.
pub async fn recommend_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Json<Response> {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "rejected request body");
            return Json(Response::error(format!("invalid request body: {}", rejection.body_text())));
        }
    };
    let req: RecommendRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => return Json(Response::error(format!("invalid request body: {e}"))),
    };
    let config = match req.top_k {
        Some(k) => state.defaults.with_top_k(k),
        None => state.defaults,
    };
    let start = std::time::Instant::now();
    let item_id = req.item_id;
    let response = tokio::task::spawn_blocking(move || respond(req.item_id, &req.items, &config, req.explain))
        .await
        .unwrap_or_else(|e| Response::error(format!("failed to compute recommendations: {e}")));
    tracing::info!(item_id, error = response.is_error(), took_ms = start.elapsed().as_millis() as u64, "recommend");
    Json(response)
}
