//! Conversation and message models, plus the unread-count query.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A conversation between exactly two users.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: i64,
    pub participant1_id: String,
    pub participant2_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: String,
}

/// Count unread messages addressed to `user_id` across all their
/// conversations. Messages the user sent themselves never count.
///
/// The conversation lookup runs first: a user with no conversations gets 0
/// without touching the messages table, which also avoids an `IN ()` clause.
pub async fn count_unread_messages(db: &SqlitePool, user_id: &str) -> Result<i64, sqlx::Error> {
    let conversation_ids: Vec<i64> = sqlx::query_scalar(
        "SELECT id FROM conversations WHERE participant1_id = ? OR participant2_id = ?",
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(db)
    .await?;

    if conversation_ids.is_empty() {
        return Ok(0);
    }

    let placeholders = vec!["?"; conversation_ids.len()].join(", ");
    let sql = format!(
        "SELECT COUNT(*) FROM messages
         WHERE conversation_id IN ({placeholders}) AND sender_id != ? AND is_read = 0"
    );

    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for id in &conversation_ids {
        query = query.bind(id);
    }
    query.bind(user_id).fetch_one(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn seed_user(db: &SqlitePool, id: &str) {
        sqlx::query("INSERT INTO users (id, email, name) VALUES (?, ?, ?)")
            .bind(id)
            .bind(format!("{id}@example.com"))
            .bind(id)
            .execute(db)
            .await
            .unwrap();
    }

    async fn seed_conversation(db: &SqlitePool, p1: &str, p2: &str) -> i64 {
        sqlx::query("INSERT INTO conversations (participant1_id, participant2_id) VALUES (?, ?)")
            .bind(p1)
            .bind(p2)
            .execute(db)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    async fn seed_message(db: &SqlitePool, conversation_id: i64, sender: &str, is_read: bool) {
        sqlx::query(
            "INSERT INTO messages (conversation_id, sender_id, body, is_read) VALUES (?, ?, ?, ?)",
        )
        .bind(conversation_id)
        .bind(sender)
        .bind("hello")
        .bind(is_read)
        .execute(db)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn user_with_no_conversations_has_zero_unread() {
        let db = test_pool().await;
        seed_user(&db, "alice").await;

        assert_eq!(count_unread_messages(&db, "alice").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn own_and_read_messages_are_not_counted() {
        let db = test_pool().await;
        seed_user(&db, "alice").await;
        seed_user(&db, "bob").await;
        let convo = seed_conversation(&db, "alice", "bob").await;

        seed_message(&db, convo, "bob", false).await; // counts
        seed_message(&db, convo, "bob", true).await; // already read
        seed_message(&db, convo, "alice", false).await; // own message

        assert_eq!(count_unread_messages(&db, "alice").await.unwrap(), 1);
        assert_eq!(count_unread_messages(&db, "bob").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unread_counts_span_all_conversations() {
        let db = test_pool().await;
        for id in ["alice", "bob", "carol"] {
            seed_user(&db, id).await;
        }
        let with_bob = seed_conversation(&db, "alice", "bob").await;
        // Works whether the user is participant1 or participant2
        let with_carol = seed_conversation(&db, "carol", "alice").await;

        seed_message(&db, with_bob, "bob", false).await;
        seed_message(&db, with_carol, "carol", false).await;
        seed_message(&db, with_carol, "carol", false).await;

        assert_eq!(count_unread_messages(&db, "alice").await.unwrap(), 3);
    }
}
