//! Courier Repository
//!
//! Load counters and availability for delivery staff.

use shared::models::Courier;
use shared::util::now_millis;
use sqlx::SqliteConnection;

use super::RepoResult;

const COURIER_COLUMNS: &str =
    "db.user_id, u.name, db.availability_status, db.current_load";

pub async fn find_by_id(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> RepoResult<Option<Courier>> {
    let courier = sqlx::query_as::<_, Courier>(&format!(
        "SELECT {COURIER_COLUMNS} FROM delivery_boy db JOIN app_user u ON u.id = db.user_id WHERE db.user_id = ?"
    ))
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(courier)
}

/// Available courier with the lowest active load, ties broken by id.
pub async fn least_loaded_available(
    conn: &mut SqliteConnection,
) -> RepoResult<Option<Courier>> {
    let courier = sqlx::query_as::<_, Courier>(&format!(
        "SELECT {COURIER_COLUMNS} FROM delivery_boy db JOIN app_user u ON u.id = db.user_id WHERE db.availability_status = 'available' ORDER BY db.current_load ASC, db.user_id ASC LIMIT 1"
    ))
    .fetch_optional(conn)
    .await?;
    Ok(courier)
}

pub async fn increment_load(conn: &mut SqliteConnection, user_id: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE delivery_boy SET current_load = current_load + 1, updated_at = ? WHERE user_id = ?",
    )
    .bind(now_millis())
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Decrement floored at zero: abort/cancel/complete may race or repeat and
/// the counter must never go negative.
pub async fn decrement_load(conn: &mut SqliteConnection, user_id: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE delivery_boy SET current_load = MAX(current_load - 1, 0), updated_at = ? WHERE user_id = ?",
    )
    .bind(now_millis())
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// All admin user ids, for abort fan-out notifications.
pub async fn admin_user_ids(conn: &mut SqliteConnection) -> RepoResult<Vec<i64>> {
    let ids: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM app_user WHERE role = 'admin' ORDER BY id ASC")
            .fetch_all(conn)
            .await?;
    Ok(ids)
}
