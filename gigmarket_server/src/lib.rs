//! # GigMarket server
//! This crate hosts the HTTP and WebSocket surface for the GigMarket engine. It is responsible for:
//! * Creating payment intents with the Razorpay gateway on behalf of authenticated clients.
//! * Receiving the two order confirmation paths (client checkout callback and gateway webhook, the latter
//!   signature-checked against the raw body) and handing them to the engine for reconciliation.
//! * The review and order query endpoints.
//! * The `/ws` chat endpoint: presence tracking and persist-then-push message relay.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](crate::config) for more information.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod razorpay_routes;
pub mod routes;
pub mod server;
pub mod ws;

#[cfg(test)]
mod endpoint_tests;
