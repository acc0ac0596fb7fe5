//! Delivery Workflow Engine
//!
//! Advances a delivery through its lifecycle, transactionally touching the
//! status ledger, the inventory counters, the delivery row, courier load
//! counters, and the notification outbox. Each operation is one
//! request-scoped database transaction; any failing step rolls the whole
//! operation back.

pub mod engine;
pub mod sourcing;
pub mod status;

pub use engine::DeliveryWorkflow;
pub use sourcing::{AscendingIdSourcing, WarehouseSourcingStrategy};
