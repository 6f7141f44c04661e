//! Listing model and view tracking.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub views: i64,
    pub created_at: String,
}

/// A single recorded view of a listing. Either `user_id` (authenticated) or
/// `session_id` (anonymous cookie) may be present, or neither.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListingView {
    pub id: i64,
    pub listing_id: i64,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub referrer: Option<String>,
    pub created_at: String,
}

pub async fn find_listing(db: &SqlitePool, id: i64) -> Result<Option<Listing>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM listings WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

/// Record one view: insert a view-log row and bump the listing counter.
///
/// Both writes run in a single transaction so the counter and the log cannot
/// diverge. The increment is a server-side `views = views + 1`, never a
/// read-then-write, so concurrent views are not lost.
pub async fn record_view(
    db: &SqlitePool,
    listing_id: i64,
    user_id: Option<&str>,
    session_id: Option<&str>,
    referrer: Option<&str>,
) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query(
        "INSERT INTO listing_views (listing_id, user_id, session_id, referrer, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(listing_id)
    .bind(user_id)
    .bind(session_id)
    .bind(referrer)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE listings SET views = views + 1 WHERE id = ?")
        .bind(listing_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn seed_listing(db: &SqlitePool, title: &str) -> i64 {
        sqlx::query("INSERT INTO listings (title) VALUES (?)")
            .bind(title)
            .execute(db)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    #[tokio::test]
    async fn n_views_increment_counter_by_n_and_log_n_rows() {
        let db = test_pool().await;
        let id = seed_listing(&db, "Vintage bicycle").await;

        for _ in 0..3 {
            record_view(&db, id, None, Some("anon-1"), None)
                .await
                .unwrap();
        }

        let listing = find_listing(&db, id).await.unwrap().unwrap();
        assert_eq!(listing.views, 3);

        let logged: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM listing_views WHERE listing_id = ?")
                .bind(id)
                .fetch_one(&db)
                .await
                .unwrap();
        assert_eq!(logged, 3);
    }

    #[tokio::test]
    async fn view_log_keeps_identity_and_referrer() {
        let db = test_pool().await;
        let id = seed_listing(&db, "Garden tools").await;

        record_view(&db, id, Some("user-7"), None, Some("https://example.com/feed"))
            .await
            .unwrap();

        let view: ListingView =
            sqlx::query_as("SELECT * FROM listing_views WHERE listing_id = ?")
                .bind(id)
                .fetch_one(&db)
                .await
                .unwrap();
        assert_eq!(view.user_id.as_deref(), Some("user-7"));
        assert_eq!(view.session_id, None);
        assert_eq!(view.referrer.as_deref(), Some("https://example.com/feed"));
    }

    #[tokio::test]
    async fn missing_listing_is_none() {
        let db = test_pool().await;
        assert!(find_listing(&db, 9999).await.unwrap().is_none());
    }
}
