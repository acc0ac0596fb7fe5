//! Warehouse sourcing strategy
//!
//! When the target warehouse is short on a product, a strategy decides
//! which other warehouses to drain and in what order. The default drains
//! by ascending warehouse id; a distance- or cost-aware strategy can be
//! swapped in without touching the reservation algorithm.

use async_trait::async_trait;
use shared::models::StockLevel;
use sqlx::SqliteConnection;

use crate::db::repository::{inventory, RepoResult};

#[async_trait]
pub trait WarehouseSourcingStrategy: Send + Sync {
    /// Candidate source warehouses holding stock of `product_id`, in the
    /// order they should be drained. The target warehouse is excluded.
    async fn candidates(
        &self,
        conn: &mut SqliteConnection,
        product_id: i64,
        target_warehouse_id: i64,
    ) -> RepoResult<Vec<StockLevel>>;
}

/// Default strategy: ascending warehouse id, not proximity or cost.
#[derive(Debug, Clone, Default)]
pub struct AscendingIdSourcing;

#[async_trait]
impl WarehouseSourcingStrategy for AscendingIdSourcing {
    async fn candidates(
        &self,
        conn: &mut SqliteConnection,
        product_id: i64,
        target_warehouse_id: i64,
    ) -> RepoResult<Vec<StockLevel>> {
        inventory::stocked_elsewhere(conn, product_id, target_warehouse_id).await
    }
}
