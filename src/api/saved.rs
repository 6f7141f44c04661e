//! Saved-item toggle endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::AuthUser;
use super::error::ApiError;
use super::validation::parse_item_type;
use crate::db::toggle_saved_item;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSavedRequest {
    pub item_type: String,
    pub item_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ToggleSavedResponse {
    pub success: bool,
    /// True when this call saved the item, false when it removed the save
    pub saved: bool,
}

/// Toggle an item in the current user's saved list
///
/// POST /api/saved
pub async fn toggle_saved(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(request): Json<ToggleSavedRequest>,
) -> Result<Json<ToggleSavedResponse>, ApiError> {
    let item_type = parse_item_type(&request.item_type).map_err(ApiError::validation)?;

    if request.item_id <= 0 {
        return Err(ApiError::validation("Item id must be a positive integer"));
    }

    let saved = toggle_saved_item(&state.db, &user.id, item_type, request.item_id).await?;

    Ok(Json(ToggleSavedResponse {
        success: true,
        saved,
    }))
}
