mod account;
pub mod auth;
mod coupons;
mod error;
mod health;
mod listings;
mod messages;
mod proxies;
mod saved;
mod validation;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/coupons", get(coupons::list_coupons))
        .route("/api/health", get(health::health))
        .route("/api/listings/:id/view", post(listings::track_view))
        .route("/api/messages/unread", get(messages::unread_count))
        .route("/api/user/password", put(account::change_password))
        .route("/api/exchange-rate", get(proxies::exchange_rate))
        .route("/api/weather", get(proxies::weather))
        .route("/api/saved", post(saved::toggle_saved))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::{self, DbPool};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn test_state() -> (Arc<AppState>, DbPool) {
        let db = db::test_pool().await;
        let state = Arc::new(AppState::new(Config::default(), db.clone()));
        (state, db)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn seed_user_with_session(db: &DbPool, user_id: &str, token: &str) {
        let hash = auth::hash_password("old-password").unwrap();
        sqlx::query("INSERT INTO users (id, email, password_hash, name) VALUES (?, ?, ?, ?)")
            .bind(user_id)
            .bind(format!("{user_id}@example.com"))
            .bind(hash)
            .bind(user_id)
            .execute(db)
            .await
            .unwrap();

        let expires = chrono::Utc::now() + chrono::Duration::days(1);
        sqlx::query(
            "INSERT INTO sessions (id, user_id, token_hash, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(format!("sess-{user_id}"))
        .bind(user_id)
        .bind(auth::hash_token(token))
        .bind(expires.to_rfc3339())
        .execute(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn health_reports_database_and_cache() {
        let (state, _db) = test_state().await;
        let app = create_router(state);

        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["database"]["status"], "healthy");
        assert_eq!(body["services"]["cache"]["configured"], false);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn view_tracking_rejects_bad_ids() {
        let (state, _db) = test_state().await;

        let response = create_router(state.clone())
            .oneshot(
                Request::post("/api/listings/abc/view")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = create_router(state.clone())
            .oneshot(
                Request::post("/api/listings/-3/view")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Well-formed id, but no such listing
        let response = create_router(state)
            .oneshot(
                Request::post("/api/listings/999/view")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn view_tracking_tolerates_missing_body_and_counts() {
        let (state, db) = test_state().await;
        let listing_id = sqlx::query("INSERT INTO listings (title) VALUES ('Bike')")
            .execute(&db)
            .await
            .unwrap()
            .last_insert_rowid();

        for _ in 0..2 {
            let response = create_router(state.clone())
                .oneshot(
                    Request::post(format!("/api/listings/{listing_id}/view"))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let views: i64 = sqlx::query_scalar("SELECT views FROM listings WHERE id = ?")
            .bind(listing_id)
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(views, 2);
    }

    #[tokio::test]
    async fn unread_count_fails_open_without_session() {
        let (state, _db) = test_state().await;

        let response = create_router(state)
            .oneshot(
                Request::get("/api/messages/unread")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn coupon_pagination_matches_contract() {
        let (state, db) = test_state().await;
        let biz = sqlx::query("INSERT INTO businesses (name) VALUES ('Shop')")
            .execute(&db)
            .await
            .unwrap()
            .last_insert_rowid();

        let now = chrono::Utc::now();
        for i in 1..=5 {
            sqlx::query(
                "INSERT INTO coupons (business_id, title, is_active, start_date, end_date)
                 VALUES (?, ?, 1, ?, ?)",
            )
            .bind(biz)
            .bind(format!("coupon-{i}"))
            .bind((now - chrono::Duration::days(1)).to_rfc3339())
            .bind((now + chrono::Duration::days(i)).to_rfc3339())
            .execute(&db)
            .await
            .unwrap();
        }

        let response = create_router(state)
            .oneshot(
                Request::get("/api/coupons?page=2&limit=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["coupons"].as_array().unwrap().len(), 2);
        assert_eq!(body["pagination"]["page"], 2);
        assert_eq!(body["pagination"]["limit"], 2);
        assert_eq!(body["pagination"]["total"], 5);
        assert_eq!(body["pagination"]["totalPages"], 3);
    }

    #[tokio::test]
    async fn password_change_requires_a_session() {
        let (state, _db) = test_state().await;

        let response = create_router(state)
            .oneshot(
                Request::put("/api/user/password")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"currentPassword": "a", "newPassword": "long-enough-1"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn password_change_verifies_the_current_password() {
        let (state, db) = test_state().await;
        seed_user_with_session(&db, "alice", "alice-token").await;

        // Wrong current password
        let response = create_router(state.clone())
            .oneshot(
                Request::put("/api/user/password")
                    .header("Authorization", "Bearer alice-token")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"currentPassword": "not-it", "newPassword": "brand-new-secret"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);

        // Correct current password
        let response = create_router(state)
            .oneshot(
                Request::put("/api/user/password")
                    .header("Authorization", "Bearer alice-token")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"currentPassword": "old-password", "newPassword": "brand-new-secret"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let stored: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE id = 'alice'")
                .fetch_one(&db)
                .await
                .unwrap();
        assert!(auth::verify_password(
            "brand-new-secret",
            stored.as_deref().unwrap()
        ));
    }

    #[tokio::test]
    async fn password_change_rejects_oauth_only_accounts() {
        let (state, db) = test_state().await;
        seed_user_with_session(&db, "bob", "bob-token").await;
        sqlx::query("UPDATE users SET password_hash = NULL WHERE id = 'bob'")
            .execute(&db)
            .await
            .unwrap();

        let response = create_router(state)
            .oneshot(
                Request::put("/api/user/password")
                    .header("Authorization", "Bearer bob-token")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"currentPassword": "anything", "newPassword": "brand-new-secret"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(
            body["error"],
            "Password change is not available for this account"
        );
    }

    #[tokio::test]
    async fn saved_toggle_requires_auth_and_flips() {
        let (state, db) = test_state().await;
        seed_user_with_session(&db, "carol", "carol-token").await;

        let response = create_router(state.clone())
            .oneshot(
                Request::post("/api/saved")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"itemType": "LISTING", "itemId": 4}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = create_router(state.clone())
            .oneshot(
                Request::post("/api/saved")
                    .header("Authorization", "Bearer carol-token")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"itemType": "COUPON", "itemId": 4}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = create_router(state.clone())
            .oneshot(
                Request::post("/api/saved")
                    .header("Authorization", "Bearer carol-token")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"itemType": "LISTING", "itemId": 4}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["saved"], true);

        let response = create_router(state)
            .oneshot(
                Request::post("/api/saved")
                    .header("Authorization", "Bearer carol-token")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"itemType": "LISTING", "itemId": 4}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["saved"], false);
    }
}
