//! Status ledger types
//!
//! The status history table is append-only: one row per transition, never
//! updated or deleted. The *current* status of an entity is the status of
//! the row with the latest `(updated_at, id)` for that entity.

use serde::{Deserialize, Serialize};

/// Which kind of entity a ledger row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum EntityType {
    Order,
    Delivery,
}

/// Delivery lifecycle status
///
/// Canonical forward sequence:
/// `assigned → left_warehouse → in_transit → delivery_completed → payment_received`.
/// `failed` and `cancelled` are absorbing. `reassigned` marks a revived
/// delivery and ranks the same as `assigned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Assigned,
    LeftWarehouse,
    InTransit,
    DeliveryCompleted,
    PaymentReceived,
    Reassigned,
    Failed,
    Cancelled,
}

/// The canonical forward sequence, in order.
pub const STATUS_SEQUENCE: [DeliveryStatus; 5] = [
    DeliveryStatus::Assigned,
    DeliveryStatus::LeftWarehouse,
    DeliveryStatus::InTransit,
    DeliveryStatus::DeliveryCompleted,
    DeliveryStatus::PaymentReceived,
];

impl DeliveryStatus {
    /// Position in the canonical forward sequence; `None` for absorbing
    /// states. `reassigned` ranks as `assigned`.
    pub fn sequence_rank(self) -> Option<usize> {
        match self {
            DeliveryStatus::Assigned | DeliveryStatus::Reassigned => Some(0),
            DeliveryStatus::LeftWarehouse => Some(1),
            DeliveryStatus::InTransit => Some(2),
            DeliveryStatus::DeliveryCompleted => Some(3),
            DeliveryStatus::PaymentReceived => Some(4),
            DeliveryStatus::Failed | DeliveryStatus::Cancelled => None,
        }
    }

    /// Absorbing states: no further transitions permitted (except revival
    /// via reassignment, which is handled at the workflow level).
    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryStatus::Failed | DeliveryStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Assigned => "assigned",
            DeliveryStatus::LeftWarehouse => "left_warehouse",
            DeliveryStatus::InTransit => "in_transit",
            DeliveryStatus::DeliveryCompleted => "delivery_completed",
            DeliveryStatus::PaymentReceived => "payment_received",
            DeliveryStatus::Reassigned => "reassigned",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the append-only status history ledger
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StatusRecord {
    pub id: i64,
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub status: DeliveryStatus,
    /// Milliseconds since epoch
    pub updated_at: i64,
    /// User ID of the actor that caused the transition
    pub updated_by: Option<i64>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_ranks_are_monotonic() {
        let ranks: Vec<usize> = STATUS_SEQUENCE
            .iter()
            .map(|s| s.sequence_rank().unwrap())
            .collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn reassigned_ranks_as_assigned() {
        assert_eq!(
            DeliveryStatus::Reassigned.sequence_rank(),
            DeliveryStatus::Assigned.sequence_rank()
        );
    }

    #[test]
    fn terminal_states_have_no_rank() {
        assert!(DeliveryStatus::Failed.is_terminal());
        assert!(DeliveryStatus::Cancelled.is_terminal());
        assert_eq!(DeliveryStatus::Failed.sequence_rank(), None);
        assert_eq!(DeliveryStatus::Cancelled.sequence_rank(), None);
    }
}
