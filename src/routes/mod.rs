//! Router assembly: game API, SPA pages, session cookies, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod session;

/// Build the application router with:
/// - Game API under `/api/...` (session cookie issued on demand)
/// - SPA pages `/`, `/language`, `/game` (accept `?lang=`)
/// - Static front end from `static_dir` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new(&state.config.static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(state.config.index_html()));

    Router::new()
        // Pages
        .route("/", get(http::http_page))
        .route("/language", get(http::http_page))
        .route("/game", get(http::http_page))
        // Game API
        .route("/api/health", get(http::http_health))
        .route("/api/set_lang/:lang", get(http::http_set_lang))
        .route("/api/get_lang", get(http::http_get_lang))
        .route("/api/languages", get(http::http_languages))
        .route("/api/next", get(http::http_next))
        .route("/api/quit", get(http::http_quit))
        .route("/api/highscore", get(http::http_get_highscore))
        .route("/api/submit", post(http::http_submit))
        // Sessions + state + CORS + HTTP tracing
        .layer(middleware::from_fn_with_state(state.clone(), session::session_cookie))
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
        // Front-end assets (pictures, audio, locales, bundle)
        .fallback_service(static_service)
}
