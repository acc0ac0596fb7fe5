//! Delivery Model
//!
//! One row per assignment of an order to a courier. Rows are never
//! physically deleted; history lives in the status ledger.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::inventory::StockTransfer;
use super::status::DeliveryStatus;

/// Delivery record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Delivery {
    pub id: i64,
    pub order_id: i64,
    /// Assigned courier; null until assignment
    pub delivery_boy_id: Option<i64>,
    pub address_id: i64,
    pub delivery_fee: f64,
    /// Milliseconds since epoch
    pub estimated_arrival: Option<i64>,
    /// Set at most once, on completion
    pub actual_arrival: Option<i64>,
    /// Terminal flag: delivery failed or was cancelled. Only reassignment
    /// may clear it.
    pub is_aborted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Active dashboard row for a courier (joined projection)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssignedDelivery {
    pub delivery_id: i64,
    pub order_id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub address_line: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub total_amount: f64,
    pub item_count: i64,
    pub estimated_arrival: Option<i64>,
    pub current_status: DeliveryStatus,
}

/// History row for a courier, with on-time flag recomputed from arrivals
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeliveryHistoryEntry {
    pub delivery_id: i64,
    pub order_id: i64,
    pub current_status: DeliveryStatus,
    pub estimated_arrival: Option<i64>,
    pub actual_arrival: Option<i64>,
    /// Null until both arrival timestamps exist
    pub on_time: Option<bool>,
    pub delivery_fee: f64,
}

/// Outcome of a products-fetched dispatch, returned to the courier app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchReport {
    pub delivery_id: i64,
    pub order_id: i64,
    /// Warehouse the order was dispatched from
    pub warehouse_id: i64,
    /// Cross-warehouse transfers performed to cover shortfalls (zero-sum)
    pub transfers: Vec<StockTransfer>,
}

// ========== Request DTOs ==========

/// Assign an order to the least-loaded available courier
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignDeliveryRequest {
    #[validate(range(min = 1))]
    pub order_id: i64,
    /// Milliseconds since epoch; defaults to now + configured window
    pub estimated_arrival: Option<i64>,
    pub delivery_fee: Option<f64>,
}

/// Courier-scoped action body (fetch / complete)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CourierActionRequest {
    #[validate(range(min = 1))]
    pub delivery_boy_id: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AbortDeliveryRequest {
    #[validate(range(min = 1))]
    pub delivery_boy_id: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelDeliveryRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReassignDeliveryRequest {
    #[validate(range(min = 1))]
    pub new_delivery_boy_id: i64,
    pub reason: Option<String>,
    /// Milliseconds since epoch; defaults to now + 2h when absent
    pub new_estimated_time: Option<i64>,
}
