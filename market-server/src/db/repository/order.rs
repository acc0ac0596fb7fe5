//! Order Repository (read-only)
//!
//! The storefront owns order creation; the workflow only resolves orders,
//! their line items, and the destination region.

use shared::models::{Order, OrderItem};
use sqlx::SqliteConnection;

use super::RepoResult;

pub async fn find_by_id(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        "SELECT id, customer_id, address_id, total_amount, created_at FROM orders WHERE id = ?",
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

pub async fn items(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, product_id, quantity, unit_price FROM order_item WHERE order_id = ? ORDER BY id ASC",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Destination region of an order, via its address.
pub async fn destination_region(
    conn: &mut SqliteConnection,
    order_id: i64,
) -> RepoResult<Option<String>> {
    let region: Option<Option<String>> = sqlx::query_scalar(
        "SELECT a.region FROM orders o JOIN address a ON a.id = o.address_id WHERE o.id = ?",
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(region.flatten())
}
