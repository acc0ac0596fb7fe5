//! Inventory Models
//!
//! Per-(product, warehouse) stock counters. `quantity_in_stock` never goes
//! negative: debits are guarded UPDATEs backed by a CHECK constraint.

use serde::{Deserialize, Serialize};

/// Physical inventory location; orders are served from the warehouse
/// matching the destination region.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
    pub region: Option<String>,
    pub created_at: i64,
}

/// Stock counter for one (product, warehouse) pair
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockLevel {
    pub product_id: i64,
    pub warehouse_id: i64,
    pub quantity_in_stock: i64,
    pub updated_at: i64,
}

/// One cross-warehouse transfer performed during dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransfer {
    pub product_id: i64,
    pub from_warehouse_id: i64,
    pub to_warehouse_id: i64,
    pub quantity: i64,
}
