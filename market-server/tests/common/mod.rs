//! Shared test fixtures: in-memory database with a small seeded world.
#![allow(dead_code)]

use market_server::core::{Config, ServerState};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

pub const CUSTOMER: i64 = 100;
pub const COURIER_A: i64 = 201;
pub const COURIER_B: i64 = 202;
pub const ADMIN: i64 = 900;
pub const WAREHOUSE_NORTH: i64 = 1;
pub const WAREHOUSE_SOUTH: i64 = 2;
pub const PRODUCT_MILK: i64 = 11;
pub const PRODUCT_RICE: i64 = 12;
pub const ORDER_MILK_X10: i64 = 41;
pub const ORDER_RICE_X2: i64 = 42;

/// In-memory SQLite with migrations applied. A single never-recycled
/// connection keeps the in-memory database alive for the test's duration.
pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("apply migrations");

    pool
}

/// Pool plus seeded users, couriers, warehouses, products, and two orders.
///
/// Stock layout: milk 4 units in the north warehouse, 8 in the south;
/// rice 50 in the north. Order 41 wants 10 milk, order 42 wants 2 rice.
/// Both orders deliver to the customer's north-region address.
pub async fn setup_seeded_pool() -> SqlitePool {
    let pool = setup_pool().await;
    let seed = r#"
        INSERT INTO app_user (id, name, role, created_at) VALUES
            (100, 'Dana', 'customer', 0),
            (201, 'Kai', 'delivery', 0),
            (202, 'Ravi', 'delivery', 0),
            (900, 'Admin', 'admin', 0);
        INSERT INTO delivery_boy (user_id, availability_status, current_load, created_at, updated_at) VALUES
            (201, 'available', 0, 0, 0),
            (202, 'available', 0, 0, 0);
        INSERT INTO warehouse (id, name, region, created_at) VALUES
            (1, 'North Hub', 'north', 0),
            (2, 'South Hub', 'south', 0);
        INSERT INTO product (id, name, price, created_at) VALUES
            (11, 'Oat Milk', 3.5, 0),
            (12, 'Rice 5kg', 12.0, 0);
        INSERT INTO inventory (product_id, warehouse_id, quantity_in_stock, updated_at) VALUES
            (11, 1, 4, 0),
            (11, 2, 8, 0),
            (12, 1, 50, 0);
        INSERT INTO address (id, customer_id, line1, city, region, created_at) VALUES
            (31, 100, '12 Cedar Way', 'Northfield', 'north', 0);
        INSERT INTO orders (id, customer_id, address_id, total_amount, created_at) VALUES
            (41, 100, 31, 35.0, 0),
            (42, 100, 31, 24.0, 0);
        INSERT INTO order_item (order_id, product_id, quantity, unit_price) VALUES
            (41, 11, 10, 3.5),
            (42, 12, 2, 12.0);
    "#;
    sqlx::raw_sql(seed).execute(&pool).await.expect("seed data");
    pool
}

pub async fn setup_state() -> ServerState {
    let pool = setup_seeded_pool().await;
    ServerState::new(Config::with_overrides("./target/test-data", 0), pool)
}

pub async fn stock(pool: &SqlitePool, product_id: i64, warehouse_id: i64) -> i64 {
    sqlx::query_scalar(
        "SELECT COALESCE((SELECT quantity_in_stock FROM inventory WHERE product_id = ? AND warehouse_id = ?), 0)",
    )
    .bind(product_id)
    .bind(warehouse_id)
    .fetch_one(pool)
    .await
    .expect("read stock")
}

pub async fn current_load(pool: &SqlitePool, courier_id: i64) -> i64 {
    sqlx::query_scalar("SELECT current_load FROM delivery_boy WHERE user_id = ?")
        .bind(courier_id)
        .fetch_one(pool)
        .await
        .expect("read load")
}

pub async fn order_status(pool: &SqlitePool, order_id: i64) -> Option<String> {
    sqlx::query_scalar(
        "SELECT status FROM status_history WHERE entity_type = 'order' AND entity_id = ? ORDER BY updated_at DESC, id DESC LIMIT 1",
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await
    .expect("read order status")
}

pub async fn delivery_status(pool: &SqlitePool, delivery_id: i64) -> Option<String> {
    sqlx::query_scalar(
        "SELECT status FROM status_history WHERE entity_type = 'delivery' AND entity_id = ? ORDER BY updated_at DESC, id DESC LIMIT 1",
    )
    .bind(delivery_id)
    .fetch_optional(pool)
    .await
    .expect("read delivery status")
}

pub async fn notification_count(pool: &SqlitePool, user_id: i64, kind: &str) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM notification WHERE user_id = ? AND notification_type = ?",
    )
    .bind(user_id)
    .bind(kind)
    .fetch_one(pool)
    .await
    .expect("count notifications")
}
