//! WebSocket chat endpoint.
//!
//! The HTTP handler only performs the upgrade; everything else (heartbeats, the join/send protocol, presence
//! bookkeeping) lives in the spawned [`chat_session`] task. One task per connection.

mod messages;
mod presence;
mod session;

pub use messages::{ClientEvent, ServerEvent};
pub use presence::PresenceDirectory;
pub use session::chat_session;

use actix_web::{web, HttpRequest, HttpResponse};
use gigmarket_engine::{traits::MessageManagement, ChatApi};
use log::trace;

use crate::route;

route!(ws_entry => Get "/ws" impl MessageManagement);
pub async fn ws_entry<B>(
    req: HttpRequest,
    stream: web::Payload,
    chat: web::Data<ChatApi<B>>,
    presence: web::Data<PresenceDirectory>,
) -> Result<HttpResponse, actix_web::Error>
where
    B: MessageManagement + 'static,
{
    trace!("💬️ WebSocket upgrade request from {:?}", req.connection_info().peer_addr());
    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;
    actix_web::rt::spawn(chat_session(session, msg_stream, chat.into_inner(), presence.into_inner()));
    Ok(response)
}
