//! Repository Module
//!
//! Free async functions over the SQLite pool. Functions that participate in
//! a workflow transaction take `&mut SqliteConnection` so the caller owns
//! the transaction boundary; read-model queries take `&SqlitePool`.

pub mod courier;
pub mod delivery;
pub mod inventory;
pub mod notification;
pub mod order;
pub mod review;
pub mod status_history;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Insufficient stock: product {product_id} short by {missing} units")]
    InsufficientStock { product_id: i64, missing: i64 },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
