//! Status machine helpers
//!
//! Delivery staff sometimes skip UI steps, so operations that expect a
//! specific status tolerate finding an earlier one: the gap is repaired by
//! inserting the missing intermediate statuses before the operation's own.
//! Transitions to *earlier* statuses are never corrected — callers reject
//! those with `InvalidState` instead.

use shared::models::{DeliveryStatus, EntityType, STATUS_SEQUENCE};
use sqlx::SqliteConnection;

use crate::db::repository::{status_history, RepoError, RepoResult};

/// Synthetic note written on auto-inserted intermediate rows.
const AUTO_ADVANCE_NOTE: &str = "auto-advanced (skipped step)";

/// Insert any missing intermediate statuses so the entity has reached at
/// least `floor`, using strictly increasing timestamps starting at
/// `start_ts` (or just past the latest ledger row, whichever is later).
/// Returns the next free timestamp.
///
/// No-op when the entity is already at or beyond `floor`. Fails with
/// `InvalidState` when the entity is in an absorbing state.
pub async fn normalize_and_advance(
    conn: &mut SqliteConnection,
    entity_type: EntityType,
    entity_id: i64,
    floor: DeliveryStatus,
    actor: Option<i64>,
    start_ts: i64,
) -> RepoResult<i64> {
    let latest = status_history::current(&mut *conn, entity_type, entity_id).await?;
    let current = latest
        .as_ref()
        .map(|r| r.status)
        .unwrap_or(DeliveryStatus::Assigned);
    if current.is_terminal() {
        return Err(RepoError::InvalidState(format!(
            "Entity is in terminal state '{current}'"
        )));
    }

    let current_rank = current.sequence_rank().unwrap_or(0);
    let floor_rank = floor
        .sequence_rank()
        .ok_or_else(|| RepoError::Validation(format!("'{floor}' is not a sequenced status")))?;

    // Clamp past the latest ledger row so inserted rows always order after
    // it, even when several transitions land in the same millisecond.
    let mut ts = latest
        .map(|r| start_ts.max(r.updated_at + 1))
        .unwrap_or(start_ts);
    for rank in (current_rank + 1)..=floor_rank {
        status_history::append(
            &mut *conn,
            entity_type,
            entity_id,
            STATUS_SEQUENCE[rank],
            ts,
            actor,
            Some(AUTO_ADVANCE_NOTE),
        )
        .await?;
        ts += 1;
    }
    Ok(ts)
}

/// Guard: the entity must still be strictly before `status` in the
/// canonical sequence (and not absorbed).
pub async fn ensure_before(
    conn: &mut SqliteConnection,
    entity_type: EntityType,
    entity_id: i64,
    status: DeliveryStatus,
) -> RepoResult<DeliveryStatus> {
    let current = status_history::current_status(conn, entity_type, entity_id).await?;
    if current.is_terminal() {
        return Err(RepoError::InvalidState(format!(
            "Entity is in terminal state '{current}'"
        )));
    }
    let current_rank = current.sequence_rank().unwrap_or(0);
    let target_rank = status
        .sequence_rank()
        .ok_or_else(|| RepoError::Validation(format!("'{status}' is not a sequenced status")))?;
    if current_rank >= target_rank {
        return Err(RepoError::InvalidState(format!(
            "Entity is already at '{current}'"
        )));
    }
    Ok(current)
}
