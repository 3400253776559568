//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - REST-ish API under `/api/v1/...`
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/categories", get(http::http_list_categories))
        .route("/api/v1/categories/:category_id/quizzes", get(http::http_category_quizzes))
        .route("/api/v1/quizzes/:quiz_id", get(http::http_get_quiz))
        .route("/api/v1/sessions", post(http::http_start_session))
        .route("/api/v1/sessions/:session_id", get(http::http_get_session))
        .route("/api/v1/sessions/:session_id/answer", post(http::http_select_answer))
        .route("/api/v1/sessions/:session_id/navigate", post(http::http_navigate))
        .route("/api/v1/sessions/:session_id/submit", post(http::http_submit_session))
        .route("/api/v1/answers/check", post(http::http_check_answer))
        .route("/api/v1/scores", get(http::http_get_scores))
        .route("/api/v1/refresh", post(http::http_refresh))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
