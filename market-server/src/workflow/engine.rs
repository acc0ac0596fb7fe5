//! Workflow operations
//!
//! One public method per lifecycle operation. Every method opens a single
//! transaction; sqlx rolls it back automatically when the `Transaction`
//! guard is dropped without commit, so an early `?` return can never leave
//! a partially applied operation behind.

use std::sync::Arc;

use shared::models::{
    Delivery, DeliveryStatus, EntityType, FetchReport, NotificationCreate, StockTransfer,
};
use shared::util::now_millis;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::repository::{
    courier, delivery, inventory, notification, order, review, status_history, RepoError,
    RepoResult,
};
use crate::workflow::sourcing::{AscendingIdSourcing, WarehouseSourcingStrategy};
use crate::workflow::status::{ensure_before, normalize_and_advance};

/// Default delivery window applied when no estimate is supplied: 2 hours.
pub const DEFAULT_DELIVERY_WINDOW_MS: i64 = 2 * 60 * 60 * 1000;

#[derive(Clone)]
pub struct DeliveryWorkflow {
    pool: SqlitePool,
    sourcing: Arc<dyn WarehouseSourcingStrategy>,
    delivery_window_ms: i64,
}

impl DeliveryWorkflow {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_sourcing(pool, Arc::new(AscendingIdSourcing))
    }

    pub fn with_sourcing(pool: SqlitePool, sourcing: Arc<dyn WarehouseSourcingStrategy>) -> Self {
        Self {
            pool,
            sourcing,
            delivery_window_ms: DEFAULT_DELIVERY_WINDOW_MS,
        }
    }

    /// Override the default estimated-arrival window (minutes).
    pub fn with_delivery_window(mut self, minutes: i64) -> Self {
        self.delivery_window_ms = minutes * 60 * 1000;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Assign an order to the least-loaded available courier.
    ///
    /// Creates the delivery row, bumps the courier's load, appends the
    /// initial `assigned` status for the order, and notifies both sides.
    pub async fn assign_delivery(
        &self,
        order_id: i64,
        estimated_arrival: Option<i64>,
        delivery_fee: Option<f64>,
    ) -> RepoResult<Delivery> {
        let mut tx = self.pool.begin().await?;

        let order = order::find_by_id(&mut tx, order_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {order_id} not found")))?;

        if delivery::active_exists_for_order(&mut tx, order_id).await? {
            return Err(RepoError::InvalidState(format!(
                "Order {order_id} already has an active delivery"
            )));
        }

        let courier = courier::least_loaded_available(&mut tx)
            .await?
            .ok_or_else(|| RepoError::Validation("No available courier".to_string()))?;

        let now = now_millis();
        let estimate = estimated_arrival.unwrap_or(now + self.delivery_window_ms);
        let created = delivery::create(
            &mut tx,
            order_id,
            courier.user_id,
            order.address_id,
            delivery_fee.unwrap_or(0.0),
            Some(estimate),
        )
        .await?;

        courier::increment_load(&mut tx, courier.user_id).await?;

        status_history::append(
            &mut tx,
            EntityType::Order,
            order_id,
            DeliveryStatus::Assigned,
            now,
            Some(courier.user_id),
            Some("delivery assigned"),
        )
        .await?;

        notification::insert(
            &mut tx,
            &NotificationCreate::for_delivery(
                courier.user_id,
                "new_assignment",
                "New delivery assigned",
                format!("Order #{order_id} has been assigned to you"),
                created.id,
            ),
        )
        .await?;
        notification::insert(
            &mut tx,
            &NotificationCreate::for_delivery(
                order.customer_id,
                "delivery_assigned",
                "Your order is on the schedule",
                format!("A courier has been assigned to order #{order_id}"),
                created.id,
            ),
        )
        .await?;

        tx.commit().await?;
        info!(delivery_id = created.id, order_id, courier_id = courier.user_id, "Delivery assigned");
        Ok(created)
    }

    /// Courier collected the products from the warehouse.
    ///
    /// Deducts stock from the target warehouse, transferring from other
    /// warehouses (strategy-ordered) when the target is short. All or
    /// nothing: a remaining shortfall aborts the entire dispatch. Transfers
    /// are zero-sum; only the final deduction reduces system-wide stock,
    /// by exactly the ordered quantity.
    pub async fn fetch_products(
        &self,
        delivery_id: i64,
        delivery_boy_id: i64,
    ) -> RepoResult<FetchReport> {
        let mut tx = self.pool.begin().await?;

        let dlv = delivery::find_active_for_courier(&mut tx, delivery_id, delivery_boy_id)
            .await?
            .ok_or_else(|| {
                RepoError::NotFound(format!(
                    "Delivery {delivery_id} not found for courier {delivery_boy_id}"
                ))
            })?;

        ensure_before(
            &mut tx,
            EntityType::Order,
            dlv.order_id,
            DeliveryStatus::LeftWarehouse,
        )
        .await?;

        // Resolve target warehouse from the destination region; fall back
        // to the first warehouse by id when no region mapping exists.
        let region = order::destination_region(&mut tx, dlv.order_id).await?;
        let target = match &region {
            Some(r) => match inventory::warehouse_for_region(&mut tx, r).await? {
                Some(w) => Some(w),
                None => inventory::first_warehouse(&mut tx).await?,
            },
            None => inventory::first_warehouse(&mut tx).await?,
        }
        .ok_or_else(|| RepoError::Validation("No warehouse configured".to_string()))?;

        let items = order::items(&mut tx, dlv.order_id).await?;
        let mut transfers: Vec<StockTransfer> = Vec::new();

        for item in &items {
            let on_hand = inventory::stock(&mut tx, item.product_id, target.id).await?;
            let mut shortfall = item.quantity - on_hand;

            if shortfall > 0 {
                let candidates = self
                    .sourcing
                    .candidates(&mut tx, item.product_id, target.id)
                    .await?;

                for source in candidates {
                    if shortfall == 0 {
                        break;
                    }
                    let take = shortfall.min(source.quantity_in_stock);
                    if take == 0 {
                        continue;
                    }
                    inventory::debit(&mut tx, item.product_id, source.warehouse_id, take).await?;
                    inventory::credit(&mut tx, item.product_id, target.id, take).await?;
                    transfers.push(StockTransfer {
                        product_id: item.product_id,
                        from_warehouse_id: source.warehouse_id,
                        to_warehouse_id: target.id,
                        quantity: take,
                    });
                    shortfall -= take;
                }

                if shortfall > 0 {
                    // Rolls back every transfer made above.
                    return Err(RepoError::InsufficientStock {
                        product_id: item.product_id,
                        missing: shortfall,
                    });
                }
            }

            inventory::debit(&mut tx, item.product_id, target.id, item.quantity).await?;
        }

        status_history::append(
            &mut tx,
            EntityType::Order,
            dlv.order_id,
            DeliveryStatus::LeftWarehouse,
            now_millis(),
            Some(delivery_boy_id),
            Some("products fetched"),
        )
        .await?;

        tx.commit().await?;
        info!(
            delivery_id,
            order_id = dlv.order_id,
            warehouse_id = target.id,
            transfers = transfers.len(),
            "Products fetched"
        );
        Ok(FetchReport {
            delivery_id,
            order_id: dlv.order_id,
            warehouse_id: target.id,
            transfers,
        })
    }

    /// Courier handed the order over. Cash on delivery: payment is
    /// considered received at completion, no separate capture step.
    pub async fn complete_delivery(
        &self,
        delivery_id: i64,
        delivery_boy_id: i64,
    ) -> RepoResult<Delivery> {
        let mut tx = self.pool.begin().await?;

        let dlv = delivery::find_active_for_courier(&mut tx, delivery_id, delivery_boy_id)
            .await?
            .ok_or_else(|| {
                RepoError::NotFound(format!(
                    "Delivery {delivery_id} not found for courier {delivery_boy_id}"
                ))
            })?;

        ensure_before(
            &mut tx,
            EntityType::Order,
            dlv.order_id,
            DeliveryStatus::DeliveryCompleted,
        )
        .await?;

        // Repair skipped steps up to in_transit before completing.
        let now = now_millis();
        let ts = normalize_and_advance(
            &mut tx,
            EntityType::Order,
            dlv.order_id,
            DeliveryStatus::InTransit,
            Some(delivery_boy_id),
            now,
        )
        .await?;

        status_history::append(
            &mut tx,
            EntityType::Order,
            dlv.order_id,
            DeliveryStatus::PaymentReceived,
            ts,
            Some(delivery_boy_id),
            Some("cash collected on delivery"),
        )
        .await?;

        // Arrival is wall-clock time; the clamped `ts` only orders ledger
        // rows and may sit a few ms ahead of the clock.
        delivery::set_actual_arrival_once(&mut tx, delivery_id, now).await?;

        status_history::append(
            &mut tx,
            EntityType::Order,
            dlv.order_id,
            DeliveryStatus::DeliveryCompleted,
            ts + 1,
            Some(delivery_boy_id),
            None,
        )
        .await?;

        courier::decrement_load(&mut tx, delivery_boy_id).await?;

        let order = order::find_by_id(&mut tx, dlv.order_id).await?;
        if let Some(order) = order {
            notification::insert(
                &mut tx,
                &NotificationCreate::for_delivery(
                    order.customer_id,
                    "delivery_completed",
                    "Order delivered",
                    format!("Order #{} has been delivered", dlv.order_id),
                    delivery_id,
                ),
            )
            .await?;
        }

        let updated = delivery::find_by_id(&mut tx, delivery_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Delivery {delivery_id} not found")))?;

        tx.commit().await?;
        info!(delivery_id, order_id = dlv.order_id, "Delivery completed");
        Ok(updated)
    }

    /// Courier rates the customer. Terminal step: the review's existence
    /// removes the delivery from the active dashboard.
    #[allow(clippy::too_many_arguments)]
    pub async fn rate_customer(
        &self,
        delivery_id: i64,
        delivery_boy_id: i64,
        rating: i64,
        comment: Option<&str>,
        was_customer_available: bool,
        behavior: Option<&str>,
    ) -> RepoResult<()> {
        if !(1..=5).contains(&rating) {
            return Err(RepoError::Validation(format!(
                "Rating must be between 1 and 5, got {rating}"
            )));
        }

        let mut tx = self.pool.begin().await?;

        let dlv = delivery::find_active_for_courier(&mut tx, delivery_id, delivery_boy_id)
            .await?
            .ok_or_else(|| {
                RepoError::NotFound(format!(
                    "Delivery {delivery_id} not found for courier {delivery_boy_id}"
                ))
            })?;

        let latest = status_history::current(&mut tx, EntityType::Order, dlv.order_id).await?;
        let current = latest
            .as_ref()
            .map(|r| r.status)
            .unwrap_or(DeliveryStatus::Assigned);
        match current {
            DeliveryStatus::PaymentReceived => {}
            DeliveryStatus::DeliveryCompleted => {
                // Promote: rating implies payment settled. Timestamp must
                // land after the completion row to become current.
                let ts = latest
                    .map(|r| now_millis().max(r.updated_at + 1))
                    .unwrap_or_else(now_millis);
                status_history::append(
                    &mut tx,
                    EntityType::Order,
                    dlv.order_id,
                    DeliveryStatus::PaymentReceived,
                    ts,
                    Some(delivery_boy_id),
                    Some("promoted on customer rating"),
                )
                .await?;
            }
            other => {
                return Err(RepoError::InvalidState(format!(
                    "Cannot rate customer while order is '{other}'"
                )));
            }
        }

        if review::exists(&mut tx, delivery_id, delivery_boy_id).await? {
            return Err(RepoError::Duplicate(format!(
                "Review already exists for delivery {delivery_id}"
            )));
        }

        let order = order::find_by_id(&mut tx, dlv.order_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", dlv.order_id)))?;

        review::insert(
            &mut tx,
            delivery_id,
            delivery_boy_id,
            order.customer_id,
            rating,
            comment,
            was_customer_available,
            behavior,
        )
        .await?;

        tx.commit().await?;
        info!(delivery_id, delivery_boy_id, rating, "Customer rated");
        Ok(())
    }

    /// Courier-initiated abort. Terminal: only reassignment can revive.
    pub async fn abort_delivery(
        &self,
        delivery_id: i64,
        delivery_boy_id: i64,
        reason: Option<&str>,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        // Lookup excludes already-aborted deliveries: aborting twice is
        // NotFound, not a second mutation.
        let dlv = delivery::find_active_for_courier(&mut tx, delivery_id, delivery_boy_id)
            .await?
            .ok_or_else(|| {
                RepoError::NotFound(format!(
                    "Delivery {delivery_id} not found for courier {delivery_boy_id}"
                ))
            })?;

        self.ensure_not_delivered(&mut tx, dlv.order_id).await?;

        delivery::mark_aborted(&mut tx, delivery_id).await?;
        courier::decrement_load(&mut tx, delivery_boy_id).await?;

        status_history::append(
            &mut tx,
            EntityType::Delivery,
            delivery_id,
            DeliveryStatus::Failed,
            now_millis(),
            Some(delivery_boy_id),
            reason,
        )
        .await?;

        let order = order::find_by_id(&mut tx, dlv.order_id).await?;
        if let Some(order) = order {
            notification::insert(
                &mut tx,
                &NotificationCreate::for_delivery(
                    order.customer_id,
                    "delivery_failed",
                    "Delivery failed",
                    format!("Delivery of order #{} could not be completed", dlv.order_id),
                    delivery_id,
                ),
            )
            .await?;
        }
        for admin_id in courier::admin_user_ids(&mut tx).await? {
            notification::insert(
                &mut tx,
                &NotificationCreate::for_delivery(
                    admin_id,
                    "delivery_aborted",
                    "Delivery aborted",
                    format!(
                        "Courier {delivery_boy_id} aborted delivery {delivery_id}: {}",
                        reason.unwrap_or("no reason given")
                    ),
                    delivery_id,
                )
                .high_priority(),
            )
            .await?;
        }

        tx.commit().await?;
        info!(delivery_id, delivery_boy_id, "Delivery aborted");
        Ok(())
    }

    /// Admin-initiated cancel. Same terminal effect as abort, recorded as
    /// `cancelled`.
    pub async fn cancel_delivery(&self, delivery_id: i64, reason: Option<&str>) -> RepoResult<()> {
        let mut tx = self.pool.begin().await?;

        let dlv = delivery::find_by_id(&mut tx, delivery_id)
            .await?
            .filter(|d| !d.is_aborted)
            .ok_or_else(|| RepoError::NotFound(format!("Delivery {delivery_id} not found")))?;

        self.ensure_not_delivered(&mut tx, dlv.order_id).await?;

        delivery::mark_aborted(&mut tx, delivery_id).await?;
        if let Some(courier_id) = dlv.delivery_boy_id {
            courier::decrement_load(&mut tx, courier_id).await?;
        }

        status_history::append(
            &mut tx,
            EntityType::Delivery,
            delivery_id,
            DeliveryStatus::Cancelled,
            now_millis(),
            None,
            reason,
        )
        .await?;

        let order = order::find_by_id(&mut tx, dlv.order_id).await?;
        if let Some(order) = order {
            notification::insert(
                &mut tx,
                &NotificationCreate::for_delivery(
                    order.customer_id,
                    "delivery_cancelled",
                    "Delivery cancelled",
                    format!("Delivery of order #{} was cancelled", dlv.order_id),
                    delivery_id,
                ),
            )
            .await?;
        }

        tx.commit().await?;
        info!(delivery_id, "Delivery cancelled");
        Ok(())
    }

    /// Move a delivery to another courier. The only operation permitted to
    /// revive an aborted delivery.
    pub async fn reassign_delivery(
        &self,
        delivery_id: i64,
        new_delivery_boy_id: i64,
        reason: Option<&str>,
        new_estimated_time: Option<i64>,
    ) -> RepoResult<Delivery> {
        let mut tx = self.pool.begin().await?;

        let dlv = delivery::find_by_id(&mut tx, delivery_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Delivery {delivery_id} not found")))?;

        self.ensure_not_delivered(&mut tx, dlv.order_id).await?;

        let new_courier = courier::find_by_id(&mut tx, new_delivery_boy_id)
            .await?
            .ok_or_else(|| {
                RepoError::NotFound(format!("Courier {new_delivery_boy_id} not found"))
            })?;
        if new_courier.availability_status != "available" {
            return Err(RepoError::InvalidState(format!(
                "Courier {new_delivery_boy_id} is not available"
            )));
        }

        // Load bookkeeping: an aborted delivery already released its old
        // courier's slot; a same-courier reassign is load-neutral.
        let same_courier = dlv.delivery_boy_id == Some(new_delivery_boy_id) && !dlv.is_aborted;
        if !same_courier {
            if !dlv.is_aborted {
                if let Some(old_id) = dlv.delivery_boy_id {
                    courier::decrement_load(&mut tx, old_id).await?;
                }
            }
            courier::increment_load(&mut tx, new_delivery_boy_id).await?;
        }

        let now = now_millis();
        let estimate = new_estimated_time.unwrap_or(now + self.delivery_window_ms);
        delivery::reassign(&mut tx, delivery_id, new_delivery_boy_id, estimate).await?;

        status_history::append(
            &mut tx,
            EntityType::Delivery,
            delivery_id,
            DeliveryStatus::Reassigned,
            now,
            Some(new_delivery_boy_id),
            reason,
        )
        .await?;

        let order = order::find_by_id(&mut tx, dlv.order_id).await?;
        if let Some(order) = order {
            notification::insert(
                &mut tx,
                &NotificationCreate::for_delivery(
                    order.customer_id,
                    "delivery_reassigned",
                    "Delivery update",
                    format!("A new courier will deliver order #{}", dlv.order_id),
                    delivery_id,
                ),
            )
            .await?;
        }
        notification::insert(
            &mut tx,
            &NotificationCreate::for_delivery(
                new_delivery_boy_id,
                "new_assignment",
                "Delivery reassigned to you",
                format!("Delivery of order #{} is now yours", dlv.order_id),
                delivery_id,
            ),
        )
        .await?;

        let updated = delivery::find_by_id(&mut tx, delivery_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Delivery {delivery_id} not found")))?;

        tx.commit().await?;
        info!(delivery_id, new_delivery_boy_id, "Delivery reassigned");
        Ok(updated)
    }

    /// Abort/cancel/reassign are only valid before the order is delivered.
    async fn ensure_not_delivered(
        &self,
        conn: &mut sqlx::SqliteConnection,
        order_id: i64,
    ) -> RepoResult<()> {
        let current =
            status_history::current_status(conn, EntityType::Order, order_id).await?;
        if current
            .sequence_rank()
            .is_some_and(|r| r >= DeliveryStatus::DeliveryCompleted.sequence_rank().unwrap_or(3))
        {
            return Err(RepoError::InvalidState(format!(
                "Order {order_id} is already '{current}'"
            )));
        }
        Ok(())
    }
}
