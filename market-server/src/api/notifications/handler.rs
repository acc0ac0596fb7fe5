//! Notification API Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use shared::models::Notification;
use shared::ApiResponse;

use crate::core::ServerState;
use crate::db::repository::notification;
use crate::utils::{ok, ok_with_message, AppError, AppResult};

/// Notifications for a user, unread first
pub async fn list_for_user(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<Notification>>>> {
    let notifications = notification::list_for_user(&state.pool, user_id).await?;
    Ok(ok(notifications))
}

/// Mark one notification as read
pub async fn mark_read(
    State(state): State<ServerState>,
    Path(notification_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let updated = notification::mark_read(&state.pool, notification_id).await?;
    if !updated {
        return Err(AppError::NotFound(format!(
            "Notification {notification_id} not found"
        )));
    }
    Ok(ok_with_message(json!({}), "Notification marked as read"))
}
