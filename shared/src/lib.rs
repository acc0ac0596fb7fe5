//! Shared types for the grocery delivery backend
//!
//! Common types used across the workspace: database row models, request
//! DTOs, the unified API response envelope, and small utilities.

pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::status::{DeliveryStatus, EntityType, StatusRecord};
pub use response::ApiResponse;
