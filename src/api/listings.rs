//! Listing view tracking.

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::OptionalUser;
use super::error::ApiError;
use super::validation::{parse_listing_id, validate_referrer};
use crate::db::{find_listing, record_view};
use crate::AppState;

/// Anonymous correlation cookie set by the frontend. Read here if present;
/// minting it is the frontend's job, never this endpoint's.
const ANON_SESSION_COOKIE: &str = "anon_session";

#[derive(Debug, Default, Deserialize)]
pub struct TrackViewRequest {
    pub referrer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrackViewResponse {
    pub success: bool,
}

/// Record a view of a listing
///
/// POST /api/listings/:id/view
///
/// The body is optional; an absent or malformed body counts as a view with no
/// referrer. The view-log insert and the counter increment either both commit
/// or the call fails with 500.
pub async fn track_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    OptionalUser(user): OptionalUser,
    jar: CookieJar,
    body: Option<Json<TrackViewRequest>>,
) -> Result<Json<TrackViewResponse>, ApiError> {
    let listing_id = parse_listing_id(&id).map_err(ApiError::validation)?;

    let request = body.map(|Json(r)| r).unwrap_or_default();
    validate_referrer(&request.referrer).map_err(ApiError::validation)?;

    find_listing(&state.db, listing_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Listing not found"))?;

    let session_id = jar.get(ANON_SESSION_COOKIE).map(|c| c.value().to_string());

    record_view(
        &state.db,
        listing_id,
        user.as_ref().map(|u| u.id.as_str()),
        session_id.as_deref(),
        request.referrer.as_deref(),
    )
    .await?;

    Ok(Json(TrackViewResponse { success: true }))
}
