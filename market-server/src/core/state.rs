//! Server state
//!
//! Shared handle passed to every handler. `Arc`-backed fields make cloning
//! cheap; the pool is the only shared resource and is checked out and
//! released per query.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::utils::AppError;
use crate::workflow::DeliveryWorkflow;

#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// Delivery workflow engine
    pub workflow: Arc<DeliveryWorkflow>,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let workflow = Arc::new(
            DeliveryWorkflow::new(pool.clone())
                .with_delivery_window(config.delivery_window_minutes),
        );
        Self {
            config,
            pool,
            workflow,
        }
    }

    /// Initialize state: working directory, database pool, migrations,
    /// workflow engine.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_work_dir()
            .map_err(|e| AppError::Internal(format!("Failed to create work dir: {e}")))?;

        let db_path = config.database_path();
        let db = DbService::new(&db_path.to_string_lossy()).await?;

        Ok(Self::new(config.clone(), db.pool))
    }
}
