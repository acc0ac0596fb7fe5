//! HTTP API tests: in-process requests against the full router stack.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use market_server::api::build_app;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;

async fn app() -> Router {
    build_app(setup_state().await)
}

async fn request(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    let request = match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = request(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn assign_then_dashboard_shows_the_delivery() {
    let app = app().await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/delivery/assign",
        Some(json!({ "order_id": ORDER_RICE_X2, "delivery_fee": 4.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["order_id"], json!(ORDER_RICE_X2));
    assert_eq!(body["data"]["delivery_boy_id"], json!(COURIER_A));

    let uri = format!("/api/delivery/getAssignedDeliveries/{COURIER_A}");
    let (status, body) = request(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["order_id"], json!(ORDER_RICE_X2));
    assert_eq!(rows[0]["customer_name"], json!("Dana"));
    assert_eq!(rows[0]["current_status"], json!("assigned"));
}

#[tokio::test]
async fn full_courier_workflow_over_http() {
    let app = app().await;

    let (_, body) = request(
        &app,
        Method::POST,
        "/api/delivery/assign",
        Some(json!({ "order_id": ORDER_MILK_X10 })),
    )
    .await;
    let delivery_id = body["data"]["id"].as_i64().unwrap();
    let courier = json!({ "delivery_boy_id": COURIER_A });

    let uri = format!("/api/delivery/markProductsFetched/{delivery_id}");
    let (status, body) = request(&app, Method::PUT, &uri, Some(courier.clone())).await;
    assert_eq!(status, StatusCode::OK);
    // 4 on hand at the target, 10 ordered: one transfer covers the rest.
    assert_eq!(body["data"]["transfers"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["transfers"][0]["quantity"], json!(6));

    let uri = format!("/api/delivery/markDeliveryCompletedNew/{delivery_id}");
    let (status, body) = request(&app, Method::PUT, &uri, Some(courier.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["actual_arrival"].is_i64());

    let uri = format!("/api/delivery/rateCustomer/{delivery_id}");
    let (status, _) = request(
        &app,
        Method::POST,
        &uri,
        Some(json!({ "delivery_boy_id": COURIER_A, "rating": 5, "comment": "prompt" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The ledger over HTTP shows the full repaired sequence.
    let uri = format!("/api/delivery/statusHistory/order/{ORDER_MILK_X10}");
    let (status, body) = request(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let statuses: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["status"].as_str().unwrap())
        .collect();
    assert_eq!(
        statuses,
        vec![
            "assigned",
            "left_warehouse",
            "in_transit",
            "payment_received",
            "delivery_completed",
            "payment_received",
        ]
    );

    // Performance and earnings read models reflect the completed run.
    let uri = format!("/api/delivery/performance/{COURIER_A}");
    let (_, body) = request(&app, Method::GET, &uri, None).await;
    assert_eq!(body["data"]["completed"], json!(1));
    assert_eq!(body["data"]["failed"], json!(0));
    assert_eq!(body["data"]["avg_rating_given"], json!(5.0));

    let uri = format!("/api/delivery/earnings/{COURIER_A}");
    let (_, body) = request(&app, Method::GET, &uri, None).await;
    assert_eq!(body["data"]["completed"], json!(1));
}

#[tokio::test]
async fn out_of_range_rating_is_a_400() {
    let app = app().await;
    let (_, body) = request(
        &app,
        Method::POST,
        "/api/delivery/assign",
        Some(json!({ "order_id": ORDER_RICE_X2 })),
    )
    .await;
    let delivery_id = body["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/delivery/markDeliveryCompletedNew/{delivery_id}");
    request(&app, Method::PUT, &uri, Some(json!({ "delivery_boy_id": COURIER_A }))).await;

    let uri = format!("/api/delivery/rateCustomer/{delivery_id}");
    let (status, body) = request(
        &app,
        Method::POST,
        &uri,
        Some(json!({ "delivery_boy_id": COURIER_A, "rating": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn duplicate_rating_is_a_409() {
    let app = app().await;
    let (_, body) = request(
        &app,
        Method::POST,
        "/api/delivery/assign",
        Some(json!({ "order_id": ORDER_RICE_X2 })),
    )
    .await;
    let delivery_id = body["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/delivery/markDeliveryCompletedNew/{delivery_id}");
    request(&app, Method::PUT, &uri, Some(json!({ "delivery_boy_id": COURIER_A }))).await;

    let uri = format!("/api/delivery/rateCustomer/{delivery_id}");
    let rating = json!({ "delivery_boy_id": COURIER_A, "rating": 4 });
    let (status, _) = request(&app, Method::POST, &uri, Some(rating.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&app, Method::POST, &uri, Some(rating)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn unknown_delivery_is_a_404() {
    let app = app().await;
    let (status, body) = request(
        &app,
        Method::PUT,
        "/api/delivery/abortDelivery/424242",
        Some(json!({ "delivery_boy_id": COURIER_A })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn cancel_and_reassign_over_http() {
    let app = app().await;
    let (_, body) = request(
        &app,
        Method::POST,
        "/api/delivery/assign",
        Some(json!({ "order_id": ORDER_RICE_X2 })),
    )
    .await;
    let delivery_id = body["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/delivery/{delivery_id}/reassign");
    let (status, body) = request(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "newDeliveryBoyId": COURIER_B, "reason": "route change" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["delivery_boy_id"], json!(COURIER_B));

    let uri = format!("/api/delivery/{delivery_id}/cancel");
    let (status, body) = request(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "reason": "out of stock" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    // Cancelling again finds nothing live.
    let (status, _) = request(&app, Method::PATCH, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notifications_are_listed_and_marked_read() {
    let app = app().await;
    request(
        &app,
        Method::POST,
        "/api/delivery/assign",
        Some(json!({ "order_id": ORDER_RICE_X2 })),
    )
    .await;

    let uri = format!("/api/notifications/{CUSTOMER}");
    let (status, body) = request(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["notification_type"], json!("delivery_assigned"));
    let notification_id = rows[0]["id"].as_i64().unwrap();

    let uri = format!("/api/notifications/{notification_id}/read");
    let (status, _) = request(&app, Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(&app, Method::PUT, "/api/notifications/424242/read", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
