//! Account management: local password change.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::{hash_password, verify_password, OptionalUser};
use super::validation::validate_password_change;
use crate::db::update_password_hash;
use crate::AppState;

/// One message for every credential mismatch. A different message for "wrong
/// password" vs "no such account" would allow account enumeration.
const INCORRECT_PASSWORD: &str = "Current password is incorrect";

const OAUTH_ONLY_ACCOUNT: &str = "Password change is not available for this account";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// This endpoint keeps its historical `{success, error}` envelope on both
/// success and failure.
#[derive(Debug, Serialize)]
pub struct ChangePasswordResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChangePasswordResponse {
    fn ok() -> Json<Self> {
        Json(Self {
            success: true,
            error: None,
        })
    }

    fn err(status: StatusCode, message: &str) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                success: false,
                error: Some(message.to_string()),
            }),
        )
    }
}

/// Change the authenticated user's password
///
/// PUT /api/user/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ChangePasswordResponse>, (StatusCode, Json<ChangePasswordResponse>)> {
    let Some(user) = user else {
        return Err(ChangePasswordResponse::err(
            StatusCode::UNAUTHORIZED,
            "Authentication required",
        ));
    };

    validate_password_change(&request.current_password, &request.new_password)
        .map_err(|e| ChangePasswordResponse::err(StatusCode::BAD_REQUEST, &e))?;

    // OAuth-only accounts carry no local hash; reject before any hash work
    let Some(stored_hash) = user.password_hash.as_deref() else {
        return Err(ChangePasswordResponse::err(
            StatusCode::BAD_REQUEST,
            OAUTH_ONLY_ACCOUNT,
        ));
    };

    if !verify_password(&request.current_password, stored_hash) {
        return Err(ChangePasswordResponse::err(
            StatusCode::BAD_REQUEST,
            INCORRECT_PASSWORD,
        ));
    }

    let new_hash = hash_password(&request.new_password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ChangePasswordResponse::err(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;

    update_password_hash(&state.db, &user.id, &new_hash)
        .await
        .map_err(|e| {
            tracing::error!("Password update failed: {}", e);
            ChangePasswordResponse::err(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(ChangePasswordResponse::ok())
}
