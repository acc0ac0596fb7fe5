//! Inventory Repository
//!
//! Stock counters keyed by (product, warehouse). Debits are guarded
//! UPDATEs checked via rows_affected, so two concurrent dispatches cannot
//! drive a counter negative; the CHECK constraint backs this up.

use shared::models::{StockLevel, Warehouse};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoError, RepoResult};

/// Stock on hand for one (product, warehouse) pair; missing row reads as 0.
pub async fn stock(
    conn: &mut SqliteConnection,
    product_id: i64,
    warehouse_id: i64,
) -> RepoResult<i64> {
    let qty: Option<i64> = sqlx::query_scalar(
        "SELECT quantity_in_stock FROM inventory WHERE product_id = ? AND warehouse_id = ?",
    )
    .bind(product_id)
    .bind(warehouse_id)
    .fetch_optional(conn)
    .await?;
    Ok(qty.unwrap_or(0))
}

/// Warehouses other than `exclude_warehouse_id` holding stock of a product,
/// ordered by ascending warehouse id.
pub async fn stocked_elsewhere(
    conn: &mut SqliteConnection,
    product_id: i64,
    exclude_warehouse_id: i64,
) -> RepoResult<Vec<StockLevel>> {
    let levels = sqlx::query_as::<_, StockLevel>(
        "SELECT product_id, warehouse_id, quantity_in_stock, updated_at FROM inventory WHERE product_id = ? AND warehouse_id != ? AND quantity_in_stock > 0 ORDER BY warehouse_id ASC",
    )
    .bind(product_id)
    .bind(exclude_warehouse_id)
    .fetch_all(conn)
    .await?;
    Ok(levels)
}

/// Debit stock, failing when fewer than `quantity` units are on hand.
///
/// The `quantity_in_stock >= ?` guard makes the read-then-write race a
/// clean failure instead of an over-deduction.
pub async fn debit(
    conn: &mut SqliteConnection,
    product_id: i64,
    warehouse_id: i64,
    quantity: i64,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE inventory SET quantity_in_stock = quantity_in_stock - ?1, updated_at = ?2 WHERE product_id = ?3 AND warehouse_id = ?4 AND quantity_in_stock >= ?1",
    )
    .bind(quantity)
    .bind(now_millis())
    .bind(product_id)
    .bind(warehouse_id)
    .execute(conn)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::InsufficientStock {
            product_id,
            missing: quantity,
        });
    }
    Ok(())
}

/// Credit stock, creating the counter row if absent.
pub async fn credit(
    conn: &mut SqliteConnection,
    product_id: i64,
    warehouse_id: i64,
    quantity: i64,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO inventory (product_id, warehouse_id, quantity_in_stock, updated_at) VALUES (?1, ?2, ?3, ?4) ON CONFLICT (product_id, warehouse_id) DO UPDATE SET quantity_in_stock = quantity_in_stock + ?3, updated_at = ?4",
    )
    .bind(product_id)
    .bind(warehouse_id)
    .bind(quantity)
    .bind(now_millis())
    .execute(conn)
    .await?;
    Ok(())
}

/// Warehouse serving a destination region.
pub async fn warehouse_for_region(
    conn: &mut SqliteConnection,
    region: &str,
) -> RepoResult<Option<Warehouse>> {
    let warehouse = sqlx::query_as::<_, Warehouse>(
        "SELECT id, name, region, created_at FROM warehouse WHERE region = ? ORDER BY id ASC LIMIT 1",
    )
    .bind(region)
    .fetch_optional(conn)
    .await?;
    Ok(warehouse)
}

/// Fallback when no warehouse is configured for the region: first by id.
pub async fn first_warehouse(conn: &mut SqliteConnection) -> RepoResult<Option<Warehouse>> {
    let warehouse = sqlx::query_as::<_, Warehouse>(
        "SELECT id, name, region, created_at FROM warehouse ORDER BY id ASC LIMIT 1",
    )
    .fetch_optional(conn)
    .await?;
    Ok(warehouse)
}

/// System-wide stock total for a product (test/report helper).
pub async fn total_stock(pool: &SqlitePool, product_id: i64) -> RepoResult<i64> {
    let total: Option<i64> = sqlx::query_scalar(
        "SELECT SUM(quantity_in_stock) FROM inventory WHERE product_id = ?",
    )
    .bind(product_id)
    .fetch_one(pool)
    .await?;
    Ok(total.unwrap_or(0))
}
