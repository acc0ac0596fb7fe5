//! Courier (delivery boy) Models

use serde::{Deserialize, Serialize};

/// Courier profile joined with the user account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Courier {
    pub user_id: i64,
    pub name: String,
    /// `available` | `unavailable` | `on_break`
    pub availability_status: String,
    /// Count of active deliveries; floored at zero on decrement
    pub current_load: i64,
}

/// Aggregate performance projection for a courier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierPerformance {
    pub delivery_boy_id: i64,
    pub completed: i64,
    pub failed: i64,
    /// Completed deliveries with `actual_arrival <= estimated_arrival`
    pub on_time: i64,
    /// `on_time / completed`; zero when nothing completed
    pub on_time_rate: f64,
    /// Average rating this courier gave customers
    pub avg_rating_given: Option<f64>,
}

/// Fee earnings over a period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsSummary {
    pub delivery_boy_id: i64,
    pub from: i64,
    pub to: i64,
    pub completed: i64,
    pub total_fees: f64,
}
