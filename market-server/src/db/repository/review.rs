//! Delivery Review Repository
//!
//! The UNIQUE (delivery_id, delivery_boy_id) index is the hard guarantee;
//! `exists` gives the workflow a clean Duplicate error first.

use shared::models::DeliveryReview;
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

use super::{RepoError, RepoResult};

pub async fn exists(
    conn: &mut SqliteConnection,
    delivery_id: i64,
    delivery_boy_id: i64,
) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM delivery_review WHERE delivery_id = ? AND delivery_boy_id = ?",
    )
    .bind(delivery_id)
    .bind(delivery_boy_id)
    .fetch_one(conn)
    .await?;
    Ok(count > 0)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert(
    conn: &mut SqliteConnection,
    delivery_id: i64,
    delivery_boy_id: i64,
    customer_id: i64,
    rating: i64,
    comment: Option<&str>,
    was_customer_available: bool,
    behavior: Option<&str>,
) -> RepoResult<()> {
    let result = sqlx::query(
        "INSERT INTO delivery_review (delivery_id, delivery_boy_id, customer_id, rating, comment, was_customer_available, behavior, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(delivery_id)
    .bind(delivery_boy_id)
    .bind(customer_id)
    .bind(rating)
    .bind(comment)
    .bind(was_customer_available)
    .bind(behavior)
    .bind(now_millis())
    .execute(conn)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            let msg = e.to_string();
            if msg.to_lowercase().contains("unique") {
                Err(RepoError::Duplicate(format!(
                    "Review already exists for delivery {delivery_id}"
                )))
            } else {
                Err(e.into())
            }
        }
    }
}

pub async fn find_for_delivery(
    pool: &SqlitePool,
    delivery_id: i64,
) -> RepoResult<Option<DeliveryReview>> {
    let review = sqlx::query_as::<_, DeliveryReview>(
        "SELECT id, delivery_id, delivery_boy_id, customer_id, rating, comment, was_customer_available, behavior, created_at FROM delivery_review WHERE delivery_id = ? LIMIT 1",
    )
    .bind(delivery_id)
    .fetch_optional(pool)
    .await?;
    Ok(review)
}

/// Average rating a courier has given customers.
pub async fn avg_rating_given(
    pool: &SqlitePool,
    delivery_boy_id: i64,
) -> RepoResult<Option<f64>> {
    let avg: Option<f64> = sqlx::query_scalar(
        "SELECT AVG(rating) FROM delivery_review WHERE delivery_boy_id = ?",
    )
    .bind(delivery_boy_id)
    .fetch_one(pool)
    .await?;
    Ok(avg)
}
