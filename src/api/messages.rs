//! Unread message badge count.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use super::auth::OptionalUser;
use crate::db::count_unread_messages;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Count unread messages for the current user
///
/// GET /api/messages/unread
///
/// This feeds a non-critical UI badge, so it fails open: no session or any
/// internal error yields `{count: 0}` rather than an error status. The
/// fail-open conversion happens here at the boundary; the query itself stays
/// an honest `Result`.
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    OptionalUser(user): OptionalUser,
) -> Json<UnreadCountResponse> {
    let Some(user) = user else {
        return Json(UnreadCountResponse { count: 0 });
    };

    let count = match count_unread_messages(&state.db, &user.id).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(user_id = %user.id, "Unread count query failed: {}", e);
            0
        }
    };

    Json(UnreadCountResponse { count })
}
