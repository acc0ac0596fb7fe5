//! Delivery API Module
//!
//! Courier workflow endpoints plus admin cancel/reassign and the courier
//! read models (dashboard, history, performance, earnings).

mod handler;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::core::ServerState;

/// Delivery router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/delivery", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Courier workflow
        .route(
            "/getAssignedDeliveries/{delivery_boy_id}",
            get(handler::get_assigned_deliveries),
        )
        .route(
            "/markProductsFetched/{delivery_id}",
            put(handler::mark_products_fetched),
        )
        .route(
            "/markDeliveryCompletedNew/{delivery_id}",
            put(handler::mark_delivery_completed),
        )
        .route("/rateCustomer/{delivery_id}", post(handler::rate_customer))
        .route("/abortDelivery/{delivery_id}", put(handler::abort_delivery))
        // Admin flows
        .route("/assign", post(handler::assign_delivery))
        .route("/{delivery_id}/cancel", patch(handler::cancel_delivery))
        .route("/{delivery_id}/reassign", patch(handler::reassign_delivery))
        // Read models
        .route("/history/{delivery_boy_id}", get(handler::history))
        .route("/performance/{delivery_boy_id}", get(handler::performance))
        .route("/earnings/{delivery_boy_id}", get(handler::earnings))
        .route(
            "/statusHistory/{entity_type}/{entity_id}",
            get(handler::status_history),
        )
}
