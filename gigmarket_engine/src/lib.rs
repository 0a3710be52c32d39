//! GigMarket Engine
//!
//! The GigMarket Engine is the transactional core of a freelance gig marketplace. It owns the behaviour the rest of
//! the platform cannot be allowed to get wrong: recording orders exactly once no matter how many payment
//! confirmations arrive, keeping gig rating aggregates honest under concurrent reviews, and persisting chat history.
//! This library is HTTP-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly. Instead, use the public API provided by the engine. The exception is the data
//!    types used in the database. These are defined in the [`mod@db_types`] module and are public.
//! 2. The engine public API ([`OrderFlowApi`], [`ReviewApi`], [`ChatApi`]). These wrap a storage backend and enforce
//!    the marketplace rules. Backends implement the traits in the [`mod@traits`] module.
pub mod db_types;
mod gme_api;
pub mod sqlite;
pub mod traits;

pub use gme_api::{conversation_key, ChatApi, CheckoutConfirmation, OrderFlowApi, PaymentCapture, ReviewApi};
pub use sqlite::SqliteDatabase;
pub use traits::{
    ChatApiError,
    MessageManagement,
    OrderFlowError,
    OrderManagement,
    ReviewApiError,
    ReviewManagement,
};
