//! Delivery Repository
//!
//! Delivery rows plus the read-model projections (dashboard, history,
//! performance, earnings). Current status is always derived from the
//! ledger, never stored on the delivery row.

use shared::models::{AssignedDelivery, Delivery, DeliveryHistoryEntry};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

use super::RepoResult;

const DELIVERY_COLUMNS: &str = "id, order_id, delivery_boy_id, address_id, delivery_fee, estimated_arrival, actual_arrival, is_aborted, created_at, updated_at";

/// Latest-row-wins status subquery for the order entity, defaulting to
/// 'assigned' when the ledger is empty.
const ORDER_STATUS_SUBQUERY: &str = "COALESCE((SELECT sh.status FROM status_history sh WHERE sh.entity_type = 'order' AND sh.entity_id = d.order_id ORDER BY sh.updated_at DESC, sh.id DESC LIMIT 1), 'assigned')";

pub async fn create(
    conn: &mut SqliteConnection,
    order_id: i64,
    delivery_boy_id: i64,
    address_id: i64,
    delivery_fee: f64,
    estimated_arrival: Option<i64>,
) -> RepoResult<Delivery> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO delivery (id, order_id, delivery_boy_id, address_id, delivery_fee, estimated_arrival, is_aborted, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(id)
    .bind(order_id)
    .bind(delivery_boy_id)
    .bind(address_id)
    .bind(delivery_fee)
    .bind(estimated_arrival)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let delivery = sqlx::query_as::<_, Delivery>(&format!(
        "SELECT {DELIVERY_COLUMNS} FROM delivery WHERE id = ?"
    ))
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(delivery)
}

pub async fn find_by_id(
    conn: &mut SqliteConnection,
    delivery_id: i64,
) -> RepoResult<Option<Delivery>> {
    let delivery = sqlx::query_as::<_, Delivery>(&format!(
        "SELECT {DELIVERY_COLUMNS} FROM delivery WHERE id = ?"
    ))
    .bind(delivery_id)
    .fetch_optional(conn)
    .await?;
    Ok(delivery)
}

/// Lookup scoped to the owning courier, excluding aborted deliveries.
/// A terminal delivery is invisible here on purpose: callers get NotFound.
pub async fn find_active_for_courier(
    conn: &mut SqliteConnection,
    delivery_id: i64,
    delivery_boy_id: i64,
) -> RepoResult<Option<Delivery>> {
    let delivery = sqlx::query_as::<_, Delivery>(&format!(
        "SELECT {DELIVERY_COLUMNS} FROM delivery WHERE id = ? AND delivery_boy_id = ? AND is_aborted = 0"
    ))
    .bind(delivery_id)
    .bind(delivery_boy_id)
    .fetch_optional(conn)
    .await?;
    Ok(delivery)
}

/// Whether the order already has a live (non-aborted) delivery.
pub async fn active_exists_for_order(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM delivery WHERE order_id = ? AND is_aborted = 0",
    )
    .bind(order_id)
    .fetch_one(conn)
    .await?;
    Ok(count > 0)
}

pub async fn mark_aborted(conn: &mut SqliteConnection, delivery_id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE delivery SET is_aborted = 1, updated_at = ? WHERE id = ?")
        .bind(now_millis())
        .bind(delivery_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Reassignment update: swap courier, clear the abort flag (sole revival
/// path), refresh the estimate.
pub async fn reassign(
    conn: &mut SqliteConnection,
    delivery_id: i64,
    new_delivery_boy_id: i64,
    estimated_arrival: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE delivery SET delivery_boy_id = ?, is_aborted = 0, estimated_arrival = ?, updated_at = ? WHERE id = ?",
    )
    .bind(new_delivery_boy_id)
    .bind(estimated_arrival)
    .bind(now_millis())
    .bind(delivery_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Set actual arrival exactly once; later calls are no-ops.
pub async fn set_actual_arrival_once(
    conn: &mut SqliteConnection,
    delivery_id: i64,
    arrived_at: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE delivery SET actual_arrival = ?, updated_at = ? WHERE id = ? AND actual_arrival IS NULL",
    )
    .bind(arrived_at)
    .bind(arrived_at)
    .bind(delivery_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Active dashboard for a courier: non-aborted, not yet reviewed.
/// Reviewed deliveries drop off by virtue of the review existing.
pub async fn assigned_list(
    pool: &SqlitePool,
    delivery_boy_id: i64,
) -> RepoResult<Vec<AssignedDelivery>> {
    let rows = sqlx::query_as::<_, AssignedDelivery>(&format!(
        "SELECT d.id AS delivery_id, d.order_id, o.customer_id, u.name AS customer_name, \
                a.line1 AS address_line, a.city, a.region, o.total_amount, \
                (SELECT COUNT(*) FROM order_item oi WHERE oi.order_id = o.id) AS item_count, \
                d.estimated_arrival, {ORDER_STATUS_SUBQUERY} AS current_status \
         FROM delivery d \
         JOIN orders o ON o.id = d.order_id \
         JOIN app_user u ON u.id = o.customer_id \
         JOIN address a ON a.id = d.address_id \
         WHERE d.delivery_boy_id = ? AND d.is_aborted = 0 \
           AND NOT EXISTS (SELECT 1 FROM delivery_review r WHERE r.delivery_id = d.id AND r.delivery_boy_id = d.delivery_boy_id) \
         ORDER BY d.created_at ASC"
    ))
    .bind(delivery_boy_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Past deliveries for a courier with recomputed on-time flag.
pub async fn history_list(
    pool: &SqlitePool,
    delivery_boy_id: i64,
) -> RepoResult<Vec<DeliveryHistoryEntry>> {
    let rows = sqlx::query_as::<_, DeliveryHistoryEntry>(&format!(
        "SELECT d.id AS delivery_id, d.order_id, {ORDER_STATUS_SUBQUERY} AS current_status, \
                d.estimated_arrival, d.actual_arrival, \
                CASE WHEN d.actual_arrival IS NULL OR d.estimated_arrival IS NULL THEN NULL \
                     ELSE d.actual_arrival <= d.estimated_arrival END AS on_time, \
                d.delivery_fee \
         FROM delivery d \
         WHERE d.delivery_boy_id = ? \
           AND (d.is_aborted = 1 OR d.actual_arrival IS NOT NULL) \
         ORDER BY d.updated_at DESC"
    ))
    .bind(delivery_boy_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// (completed, on_time, failed) counts for a courier.
pub async fn performance_counts(
    pool: &SqlitePool,
    delivery_boy_id: i64,
) -> RepoResult<(i64, i64, i64)> {
    let (completed, on_time): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(actual_arrival <= estimated_arrival), 0) FROM delivery WHERE delivery_boy_id = ? AND actual_arrival IS NOT NULL",
    )
    .bind(delivery_boy_id)
    .fetch_one(pool)
    .await?;

    let failed: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM delivery WHERE delivery_boy_id = ? AND is_aborted = 1",
    )
    .bind(delivery_boy_id)
    .fetch_one(pool)
    .await?;

    Ok((completed, on_time, failed))
}

/// (completed, total_fees) over completed deliveries in [from, to).
pub async fn earnings(
    pool: &SqlitePool,
    delivery_boy_id: i64,
    from: i64,
    to: i64,
) -> RepoResult<(i64, f64)> {
    let (completed, total_fees): (i64, Option<f64>) = sqlx::query_as(
        "SELECT COUNT(*), SUM(delivery_fee) FROM delivery WHERE delivery_boy_id = ? AND actual_arrival IS NOT NULL AND actual_arrival >= ? AND actual_arrival < ?",
    )
    .bind(delivery_boy_id)
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;
    Ok((completed, total_fees.unwrap_or(0.0)))
}
