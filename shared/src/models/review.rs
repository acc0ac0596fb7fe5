//! Delivery Review Model
//!
//! Courier-rates-customer review written as the terminal workflow step.
//! At most one review per (delivery, courier) pair.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeliveryReview {
    pub id: i64,
    pub delivery_id: i64,
    pub delivery_boy_id: i64,
    pub customer_id: i64,
    /// 1..=5
    pub rating: i64,
    pub comment: Option<String>,
    pub was_customer_available: bool,
    pub behavior: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateCustomerRequest {
    #[validate(range(min = 1))]
    pub delivery_boy_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    #[serde(default = "default_true")]
    pub was_customer_available: bool,
    pub behavior: Option<String>,
}

fn default_true() -> bool {
    true
}
