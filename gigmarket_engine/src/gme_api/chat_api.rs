use log::*;

use crate::{
    db_types::{Message, NewMessage},
    traits::{ChatApiError, MessageManagement},
};

/// The canonical conversation id for a pair of users: both ids, sorted, joined with a colon.
/// Symmetric, so either participant derives the same key.
pub fn conversation_key(user_a: &str, user_b: &str) -> String {
    if user_a <= user_b {
        format!("{user_a}:{user_b}")
    } else {
        format!("{user_b}:{user_a}")
    }
}

/// `ChatApi` owns the durable side of messaging. Every message is persisted here first; pushing
/// a live copy to a connected recipient happens upstream and is allowed to fail.
pub struct ChatApi<B> {
    db: B,
}

impl<B> ChatApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ChatApi<B>
where B: MessageManagement
{
    /// Persists a message from `sender_id` to `receiver_id` and returns the stored record.
    pub async fn record_chat(&self, sender_id: &str, receiver_id: &str, body: String) -> Result<Message, ChatApiError> {
        let conversation_id = conversation_key(sender_id, receiver_id);
        let message = NewMessage { conversation_id, sender_id: sender_id.to_string(), body };
        let message = self.db.insert_message(message).await?;
        debug!(
            "💬️ Message {} from [{sender_id}] stored in conversation {}",
            message.id, message.conversation_id
        );
        Ok(message)
    }

    pub async fn history(&self, conversation_id: &str) -> Result<Vec<Message>, ChatApiError> {
        self.db.fetch_messages_for_conversation(conversation_id).await
    }
}
