//! Per-connection chat session loop.
//!
//! Each WebSocket connection runs one instance of [`chat_session`] on the actix runtime. The loop pings the client
//! every [`HEARTBEAT_INTERVAL`] and drops connections that stay silent for [`CLIENT_TIMEOUT`]. Incoming frames are
//! handled inline; the only slow work per frame is the database write, which must complete before any live push is
//! attempted.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use actix_ws::{Message, MessageStream, Session};
use gigmarket_engine::{traits::MessageManagement, ChatApi};
use log::{debug, info, warn};
use tokio::time;

use crate::ws::{
    messages::{ClientEvent, ServerEvent},
    presence::PresenceDirectory,
};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Drives a single chat connection until the client disconnects, times out, or the stream errors.
pub async fn chat_session<B>(
    mut session: Session,
    mut stream: MessageStream,
    chat: Arc<ChatApi<B>>,
    presence: Arc<PresenceDirectory>,
) where
    B: MessageManagement,
{
    // Set on the first join frame. A connection that never joins can still send messages, it just
    // isn't reachable for pushes.
    let mut identity: Option<(String, u64)> = None;
    let mut last_heartbeat = Instant::now();
    let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);
    let close_reason = loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if Instant::now().duration_since(last_heartbeat) > CLIENT_TIMEOUT {
                    debug!("💬️ No traffic for {CLIENT_TIMEOUT:?}. Dropping the connection.");
                    break None;
                }
                if session.ping(b"").await.is_err() {
                    break None;
                }
            },
            message = stream.recv() => match message {
                Some(Ok(Message::Text(frame))) => {
                    last_heartbeat = Instant::now();
                    handle_client_event(&mut session, &chat, &presence, &mut identity, frame.as_ref()).await;
                },
                Some(Ok(Message::Ping(payload))) => {
                    last_heartbeat = Instant::now();
                    if session.pong(&payload).await.is_err() {
                        break None;
                    }
                },
                Some(Ok(Message::Close(reason))) => break reason,
                Some(Ok(_)) => {
                    last_heartbeat = Instant::now();
                },
                Some(Err(e)) => {
                    debug!("💬️ WebSocket protocol error. {e}");
                    break None;
                },
                None => break None,
            },
        }
    };
    if let Some((user_id, conn_id)) = identity {
        if presence.remove_if_current(&user_id, conn_id) {
            info!("💬️ [{user_id}] went offline. {} users online.", presence.online_count());
        }
    }
    let _ = session.close(close_reason).await;
}

async fn handle_client_event<B: MessageManagement>(
    session: &mut Session,
    chat: &ChatApi<B>,
    presence: &PresenceDirectory,
    identity: &mut Option<(String, u64)>,
    frame: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(frame) {
        Ok(event) => event,
        Err(e) => {
            debug!("💬️ Dropping a malformed chat frame. {e}");
            let _ = send_event(session, &ServerEvent::Error { message: format!("Malformed frame. {e}") }).await;
            return;
        },
    };
    match event {
        ClientEvent::Join { user_id } => {
            // A second join on the same connection re-identifies it. The previous entry must go,
            // or it would linger until that user reconnects elsewhere.
            if let Some((old_user_id, old_conn_id)) = identity.take() {
                presence.remove_if_current(&old_user_id, old_conn_id);
            }
            let conn_id = presence.join(&user_id, session.clone());
            info!("💬️ [{user_id}] is online. {} users online.", presence.online_count());
            *identity = Some((user_id, conn_id));
        },
        ClientEvent::SendMessage { sender_id, receiver_id, message } => {
            match chat.record_chat(&sender_id, &receiver_id, message).await {
                Ok(stored) => {
                    // The message is durable at this point. The push is best effort only; an
                    // offline recipient reads it from history later.
                    if let Some(mut receiver) = presence.session_for(&receiver_id) {
                        let event = ServerEvent::ReceiveMessage {
                            sender_id: stored.sender_id,
                            message: stored.body,
                            sent_at: stored.created_at,
                        };
                        if send_event(&mut receiver, &event).await.is_err() {
                            debug!("💬️ [{receiver_id}] dropped before the push could be delivered.");
                        }
                    }
                },
                Err(e) => {
                    warn!("💬️ Could not store a chat message from [{sender_id}]. {e}");
                    let _ = send_event(session, &ServerEvent::Error {
                        message: "Your message could not be stored.".to_string(),
                    })
                    .await;
                },
            }
        },
    }
}

async fn send_event(session: &mut Session, event: &ServerEvent) -> Result<(), actix_ws::Closed> {
    match serde_json::to_string(event) {
        Ok(body) => session.text(body).await,
        Err(e) => {
            debug!("💬️ Could not serialize a server event. {e}");
            Ok(())
        },
    }
}
