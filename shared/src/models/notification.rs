//! Notification Outbox Models
//!
//! Rows are written once inside workflow transactions and consumed by a
//! separate notification subsystem.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<i64>,
    /// `low` | `normal` | `high`
    pub priority: String,
    pub is_read: bool,
    pub created_at: i64,
}

/// Payload for inserting an outbox row
#[derive(Debug, Clone)]
pub struct NotificationCreate {
    pub user_id: i64,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<i64>,
    pub priority: String,
}

impl NotificationCreate {
    /// Delivery-scoped notification with normal priority
    pub fn for_delivery(
        user_id: i64,
        notification_type: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        delivery_id: i64,
    ) -> Self {
        Self {
            user_id,
            notification_type: notification_type.into(),
            title: title.into(),
            message: message.into(),
            reference_type: Some("delivery".to_string()),
            reference_id: Some(delivery_id),
            priority: "normal".to_string(),
        }
    }

    pub fn high_priority(mut self) -> Self {
        self.priority = "high".to_string();
        self
    }
}
