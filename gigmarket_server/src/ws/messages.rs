//! The chat wire protocol.
//!
//! Frames are JSON objects tagged with a `type` field. Clients send `join` and `sendMessage`; the server pushes
//! `receiveMessage` to the recipient and `error` back to a sender whose frame could not be handled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    Join { user_id: String },
    #[serde(rename_all = "camelCase")]
    SendMessage { sender_id: String, receiver_id: String, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    ReceiveMessage { sender_id: String, message: String, sent_at: DateTime<Utc> },
    #[serde(rename_all = "camelCase")]
    Error { message: String },
}
