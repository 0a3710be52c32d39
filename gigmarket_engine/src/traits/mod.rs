//! The traits a storage backend must implement to drive the marketplace flows.
//!
//! The engine exposes three families of behaviour, one trait each:
//! * [`OrderManagement`]: recording paid orders idempotently and fetching them back,
//! * [`ReviewManagement`]: the review lifecycle, including the gig rating aggregate,
//! * [`MessageManagement`]: durable chat history.
//!
//! [`SqliteDatabase`](crate::SqliteDatabase) implements all three. The API layer in
//! [`gme_api`](crate::OrderFlowApi) is generic over these traits so that tests can substitute
//! mock backends.

mod message_management;
mod order_management;
mod review_management;

pub use message_management::{ChatApiError, MessageManagement};
pub use order_management::{OrderFlowError, OrderManagement};
pub use review_management::{ReviewApiError, ReviewManagement};
