//! HTTP API
//!
//! Routers and handlers, one module per domain.

pub mod delivery;
pub mod health;
pub mod notifications;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(delivery::router())
        .merge(notifications::router())
        .merge(health::router())
}

/// Build the fully configured application with middleware and state.
///
/// Used by both the HTTP server and in-process test calls.
pub fn build_app(state: ServerState) -> Router {
    build_router()
        // CORS - the SPA is served from another origin
        .layer(CorsLayer::permissive())
        // Gzip compress responses
        .layer(CompressionLayer::new())
        // Request logging - outermost, executed first
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
