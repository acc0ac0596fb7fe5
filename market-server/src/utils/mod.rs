//! Utility module
//!
//! - [`AppError`] - application error type
//! - [`AppResult`] - handler result alias
//! - logger setup

pub mod error;
pub mod logger;

pub use error::{ok, ok_with_message, AppError};

/// Application-level Result type used by HTTP handlers
pub type AppResult<T> = Result<T, AppError>;
