//! Delivery API Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::models::{
    AbortDeliveryRequest, AssignDeliveryRequest, AssignedDelivery, CancelDeliveryRequest,
    CourierActionRequest, CourierPerformance, Delivery, DeliveryHistoryEntry, EarningsSummary,
    EntityType, FetchReport, RateCustomerRequest, ReassignDeliveryRequest, StatusRecord,
};
use shared::util::now_millis;
use shared::ApiResponse;
use validator::Validate;

use crate::core::ServerState;
use crate::db::repository::{delivery, review, status_history};
use crate::utils::{ok, ok_with_message, AppError, AppResult};

/// List active, unreviewed deliveries for a courier
pub async fn get_assigned_deliveries(
    State(state): State<ServerState>,
    Path(delivery_boy_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<AssignedDelivery>>>> {
    let deliveries = delivery::assigned_list(&state.pool, delivery_boy_id)
        .await
        .map_err(AppError::from)?;
    Ok(ok(deliveries))
}

/// Assign an order to the least-loaded available courier
pub async fn assign_delivery(
    State(state): State<ServerState>,
    Json(payload): Json<AssignDeliveryRequest>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    payload.validate()?;
    let created = state
        .workflow
        .assign_delivery(
            payload.order_id,
            payload.estimated_arrival,
            payload.delivery_fee,
        )
        .await?;
    Ok(ok_with_message(created, "Delivery assigned"))
}

/// Courier collected the products from the warehouse
pub async fn mark_products_fetched(
    State(state): State<ServerState>,
    Path(delivery_id): Path<i64>,
    Json(payload): Json<CourierActionRequest>,
) -> AppResult<Json<ApiResponse<FetchReport>>> {
    payload.validate()?;
    let report = state
        .workflow
        .fetch_products(delivery_id, payload.delivery_boy_id)
        .await?;
    Ok(ok_with_message(report, "Products marked as fetched"))
}

/// Courier handed the order over
pub async fn mark_delivery_completed(
    State(state): State<ServerState>,
    Path(delivery_id): Path<i64>,
    Json(payload): Json<CourierActionRequest>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    payload.validate()?;
    let updated = state
        .workflow
        .complete_delivery(delivery_id, payload.delivery_boy_id)
        .await?;
    Ok(ok_with_message(updated, "Delivery completed"))
}

/// Courier rates the customer (terminal workflow step)
pub async fn rate_customer(
    State(state): State<ServerState>,
    Path(delivery_id): Path<i64>,
    Json(payload): Json<RateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Value>>> {
    payload.validate()?;
    state
        .workflow
        .rate_customer(
            delivery_id,
            payload.delivery_boy_id,
            payload.rating,
            payload.comment.as_deref(),
            payload.was_customer_available,
            payload.behavior.as_deref(),
        )
        .await?;
    Ok(ok_with_message(json!({}), "Customer rated"))
}

/// Courier-initiated abort
pub async fn abort_delivery(
    State(state): State<ServerState>,
    Path(delivery_id): Path<i64>,
    Json(payload): Json<AbortDeliveryRequest>,
) -> AppResult<Json<ApiResponse<Value>>> {
    payload.validate()?;
    state
        .workflow
        .abort_delivery(
            delivery_id,
            payload.delivery_boy_id,
            payload.reason.as_deref(),
        )
        .await?;
    Ok(ok_with_message(json!({}), "Delivery aborted"))
}

/// Admin-initiated cancel
pub async fn cancel_delivery(
    State(state): State<ServerState>,
    Path(delivery_id): Path<i64>,
    Json(payload): Json<CancelDeliveryRequest>,
) -> AppResult<Json<ApiResponse<Value>>> {
    state
        .workflow
        .cancel_delivery(delivery_id, payload.reason.as_deref())
        .await?;
    Ok(ok_with_message(json!({}), "Delivery cancelled"))
}

/// Admin-initiated reassignment (sole revival path for aborted deliveries)
pub async fn reassign_delivery(
    State(state): State<ServerState>,
    Path(delivery_id): Path<i64>,
    Json(payload): Json<ReassignDeliveryRequest>,
) -> AppResult<Json<ApiResponse<Delivery>>> {
    payload.validate()?;
    let updated = state
        .workflow
        .reassign_delivery(
            delivery_id,
            payload.new_delivery_boy_id,
            payload.reason.as_deref(),
            payload.new_estimated_time,
        )
        .await?;
    Ok(ok_with_message(updated, "Delivery reassigned"))
}

/// Courier delivery history with recomputed on-time flags
pub async fn history(
    State(state): State<ServerState>,
    Path(delivery_boy_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<DeliveryHistoryEntry>>>> {
    let entries = delivery::history_list(&state.pool, delivery_boy_id)
        .await
        .map_err(AppError::from)?;
    Ok(ok(entries))
}

/// Courier performance summary
pub async fn performance(
    State(state): State<ServerState>,
    Path(delivery_boy_id): Path<i64>,
) -> AppResult<Json<ApiResponse<CourierPerformance>>> {
    let (completed, on_time, failed) =
        delivery::performance_counts(&state.pool, delivery_boy_id).await?;
    let avg_rating_given = review::avg_rating_given(&state.pool, delivery_boy_id).await?;

    let on_time_rate = if completed > 0 {
        on_time as f64 / completed as f64
    } else {
        0.0
    };

    Ok(ok(CourierPerformance {
        delivery_boy_id,
        completed,
        failed,
        on_time,
        on_time_rate,
        avg_rating_given,
    }))
}

#[derive(Debug, Deserialize)]
pub struct EarningsQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

/// Courier fee earnings over a period (defaults to all time)
pub async fn earnings(
    State(state): State<ServerState>,
    Path(delivery_boy_id): Path<i64>,
    Query(query): Query<EarningsQuery>,
) -> AppResult<Json<ApiResponse<EarningsSummary>>> {
    let from = query.from.unwrap_or(0);
    // The window is half-open [from, to); default covers through "now".
    let to = query.to.unwrap_or_else(|| now_millis() + 1);
    let (completed, total_fees) =
        delivery::earnings(&state.pool, delivery_boy_id, from, to).await?;

    Ok(ok(EarningsSummary {
        delivery_boy_id,
        from,
        to,
        completed,
        total_fees,
    }))
}

/// Full status ledger for an entity, oldest first
pub async fn status_history(
    State(state): State<ServerState>,
    Path((entity_type, entity_id)): Path<(String, i64)>,
) -> AppResult<Json<ApiResponse<Vec<StatusRecord>>>> {
    let entity_type = match entity_type.as_str() {
        "order" => EntityType::Order,
        "delivery" => EntityType::Delivery,
        other => {
            return Err(AppError::Validation(format!(
                "Unknown entity type '{other}'"
            )))
        }
    };
    let records = status_history::history(&state.pool, entity_type, entity_id).await?;
    Ok(ok(records))
}
