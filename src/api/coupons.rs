//! Coupon listing endpoint.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use super::error::ApiError;
use crate::db::{list_active_coupons, CouponListResponse, CouponQuery};
use crate::AppState;

/// List currently active coupons, paginated and soonest-expiring first
///
/// GET /api/coupons?page=1&limit=12&category=food&business_id=3
pub async fn list_coupons(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CouponQuery>,
) -> Result<Json<CouponListResponse>, ApiError> {
    let result = list_active_coupons(&state.db, &query).await?;
    Ok(Json(result))
}
