//! Saved items (bookmarks) with an idempotent save/unsave toggle.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Kinds of content a user can save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SavedItemType {
    Listing,
    Article,
}

impl SavedItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SavedItemType::Listing => "LISTING",
            SavedItemType::Article => "ARTICLE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SavedItem {
    pub id: i64,
    pub user_id: String,
    pub item_type: String,
    pub item_id: i64,
    pub created_at: String,
}

/// Toggle an item in a user's saved list. Returns true when the call saved
/// the item, false when it removed an existing save.
pub async fn toggle_saved_item(
    db: &SqlitePool,
    user_id: &str,
    item_type: SavedItemType,
    item_id: i64,
) -> Result<bool, sqlx::Error> {
    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM saved_items WHERE user_id = ? AND item_type = ? AND item_id = ?",
    )
    .bind(user_id)
    .bind(item_type.as_str())
    .bind(item_id)
    .fetch_optional(db)
    .await?;

    match existing {
        Some(id) => {
            sqlx::query("DELETE FROM saved_items WHERE id = ?")
                .bind(id)
                .execute(db)
                .await?;
            Ok(false)
        }
        None => {
            sqlx::query(
                "INSERT INTO saved_items (user_id, item_type, item_id) VALUES (?, ?, ?)",
            )
            .bind(user_id)
            .bind(item_type.as_str())
            .bind(item_id)
            .execute(db)
            .await?;
            Ok(true)
        }
    }
}
