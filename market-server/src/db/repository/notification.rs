//! Notification Outbox Repository
//!
//! Write-once rows emitted inside workflow transactions; the read side is
//! for the UI polling endpoints only.

use shared::models::{Notification, NotificationCreate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

use super::RepoResult;

pub async fn insert(conn: &mut SqliteConnection, create: &NotificationCreate) -> RepoResult<i64> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO notification (id, user_id, notification_type, title, message, reference_type, reference_id, priority, is_read, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(id)
    .bind(create.user_id)
    .bind(&create.notification_type)
    .bind(&create.title)
    .bind(&create.message)
    .bind(&create.reference_type)
    .bind(create.reference_id)
    .bind(&create.priority)
    .bind(now_millis())
    .execute(conn)
    .await?;
    Ok(id)
}

/// Notifications for a user, unread first, newest within each group.
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Notification>> {
    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT id, user_id, notification_type, title, message, reference_type, reference_id, priority, is_read, created_at FROM notification WHERE user_id = ? ORDER BY is_read ASC, created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(notifications)
}

/// Mark one notification read; returns false when it does not exist.
pub async fn mark_read(pool: &SqlitePool, notification_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE notification SET is_read = 1 WHERE id = ?")
        .bind(notification_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
