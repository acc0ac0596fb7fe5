//! Domain models
//!
//! Database row types (`sqlx::FromRow`) and request/response DTOs shared
//! between the server and its tests.

pub mod courier;
pub mod delivery;
pub mod inventory;
pub mod notification;
pub mod order;
pub mod review;
pub mod status;

pub use courier::{Courier, CourierPerformance, EarningsSummary};
pub use delivery::{
    AbortDeliveryRequest, AssignDeliveryRequest, AssignedDelivery, CancelDeliveryRequest,
    CourierActionRequest, Delivery, DeliveryHistoryEntry, FetchReport, ReassignDeliveryRequest,
};
pub use inventory::{StockLevel, StockTransfer, Warehouse};
pub use notification::{Notification, NotificationCreate};
pub use order::{Order, OrderItem};
pub use review::{DeliveryReview, RateCustomerRequest};
pub use status::{DeliveryStatus, EntityType, StatusRecord, STATUS_SEQUENCE};
