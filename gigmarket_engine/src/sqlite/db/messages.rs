use sqlx::SqliteConnection;

use crate::db_types::{Message, NewMessage};

pub async fn insert_message(message: NewMessage, conn: &mut SqliteConnection) -> Result<Message, sqlx::Error> {
    let message = sqlx::query_as(
        r#"
            INSERT INTO messages (conversation_id, sender_id, body)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(message.conversation_id)
    .bind(message.sender_id)
    .bind(message.body)
    .fetch_one(conn)
    .await?;
    Ok(message)
}

/// Conversation history, oldest first. `created_at` only resolves to the second, so the row id
/// breaks ties for messages stored in the same second.
pub async fn fetch_messages_for_conversation(
    conversation_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Message>, sqlx::Error> {
    let messages =
        sqlx::query_as("SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at ASC, id ASC")
            .bind(conversation_id)
            .fetch_all(conn)
            .await?;
    Ok(messages)
}
