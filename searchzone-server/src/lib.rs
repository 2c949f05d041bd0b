//! HTTP front end of the search-area estimator.
//!
//! Loads one road network at startup and answers search requests in the
//! `simulate` and `mandatory` modes; the latter calls an external isochrone
//! service for the reachable area.

pub mod config;
pub mod error;
pub mod handlers;
pub mod isochrone;
pub mod state;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{BoxError, Router};
use tower::ServiceBuilder;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Router with tracing, CORS, request timeout and a concurrency limit
pub fn app(state: AppState) -> Router {
    let timeout = state.config().request_timeout();
    let limit = state.config().concurrency_limit.max(1);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/info", get(handlers::info))
        .route("/search", post(handlers::search))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(timeout))
                .layer(ConcurrencyLimitLayer::new(limit)),
        )
        .with_state(state)
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled middleware error: {err}"),
        )
    }
}
