//! Status History Repository
//!
//! Append-only ledger. Inserts never check for duplicates or ordering;
//! sequencing is the workflow engine's responsibility. The current status
//! of an entity is derived from the latest `(updated_at, id)` row.

use shared::models::{DeliveryStatus, EntityType, StatusRecord};
use sqlx::{SqliteConnection, SqlitePool};

use super::RepoResult;

/// Append one transition row inside the caller's transaction.
pub async fn append(
    conn: &mut SqliteConnection,
    entity_type: EntityType,
    entity_id: i64,
    status: DeliveryStatus,
    updated_at: i64,
    updated_by: Option<i64>,
    notes: Option<&str>,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO status_history (entity_type, entity_id, status, updated_at, updated_by, notes) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(entity_type)
    .bind(entity_id)
    .bind(status)
    .bind(updated_at)
    .bind(updated_by)
    .bind(notes)
    .execute(conn)
    .await?;
    Ok(())
}

/// Latest ledger row for an entity, or None when no row exists yet.
pub async fn current(
    conn: &mut SqliteConnection,
    entity_type: EntityType,
    entity_id: i64,
) -> RepoResult<Option<StatusRecord>> {
    let record = sqlx::query_as::<_, StatusRecord>(
        "SELECT id, entity_type, entity_id, status, updated_at, updated_by, notes FROM status_history WHERE entity_type = ? AND entity_id = ? ORDER BY updated_at DESC, id DESC LIMIT 1",
    )
    .bind(entity_type)
    .bind(entity_id)
    .fetch_optional(conn)
    .await?;
    Ok(record)
}

/// Derived current status; entities with no ledger rows default to
/// `assigned` (the row is created by assignment).
pub async fn current_status(
    conn: &mut SqliteConnection,
    entity_type: EntityType,
    entity_id: i64,
) -> RepoResult<DeliveryStatus> {
    Ok(current(conn, entity_type, entity_id)
        .await?
        .map(|r| r.status)
        .unwrap_or(DeliveryStatus::Assigned))
}

/// Full transition history for an entity, oldest first.
pub async fn history(
    pool: &SqlitePool,
    entity_type: EntityType,
    entity_id: i64,
) -> RepoResult<Vec<StatusRecord>> {
    let records = sqlx::query_as::<_, StatusRecord>(
        "SELECT id, entity_type, entity_id, status, updated_at, updated_by, notes FROM status_history WHERE entity_type = ? AND entity_id = ? ORDER BY updated_at ASC, id ASC",
    )
    .bind(entity_type)
    .bind(entity_id)
    .fetch_all(pool)
    .await?;
    Ok(records)
}
