//! Notification API Module
//!
//! Read side of the outbox, polled by the UI.

mod handler;

use axum::{
    routing::{get, put},
    Router,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/notifications", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{user_id}", get(handler::list_for_user))
        .route("/{notification_id}/read", put(handler::mark_read))
}
