//! User and session models.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    /// None for OAuth-only accounts with no local password
    pub password_hash: Option<String>,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: String,
    pub created_at: String,
}

/// Look up the user behind an unexpired session token hash.
pub async fn find_user_by_session(
    db: &SqlitePool,
    token_hash: &str,
) -> Result<Option<User>, sqlx::Error> {
    let session: Option<Session> = sqlx::query_as(
        "SELECT * FROM sessions WHERE token_hash = ? AND expires_at > ?",
    )
    .bind(token_hash)
    .bind(chrono::Utc::now().to_rfc3339())
    .fetch_optional(db)
    .await?;

    let Some(session) = session else {
        return Ok(None);
    };

    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&session.user_id)
        .fetch_optional(db)
        .await
}

/// Replace a user's password hash.
pub async fn update_password_hash(
    db: &SqlitePool,
    user_id: &str,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}
