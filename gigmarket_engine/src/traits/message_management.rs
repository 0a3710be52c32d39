use thiserror::Error;

use crate::db_types::{Message, NewMessage};

#[derive(Debug, Clone, Error)]
pub enum ChatApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for ChatApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// Storage behaviour for chat history. Persistence is unconditional; whether the recipient was
/// online to receive a live copy is not this layer's concern.
#[allow(async_fn_in_trait)]
pub trait MessageManagement {
    async fn insert_message(&self, message: NewMessage) -> Result<Message, ChatApiError>;

    /// The full history of a conversation, oldest first.
    async fn fetch_messages_for_conversation(&self, conversation_id: &str) -> Result<Vec<Message>, ChatApiError>;
}
