mod api;
mod config;
mod error;

mod data_objects;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{
    IntentNotes,
    NewPaymentIntent,
    PaymentEntity,
    PaymentIntent,
    WebhookEvent,
    PAYMENT_CAPTURED_EVENT,
};
pub use error::RazorpayApiError;
