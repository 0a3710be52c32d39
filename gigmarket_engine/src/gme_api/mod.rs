mod chat_api;
mod order_flow_api;
mod review_api;

pub use chat_api::{conversation_key, ChatApi};
pub use order_flow_api::{CheckoutConfirmation, OrderFlowApi, PaymentCapture};
pub use review_api::ReviewApi;
