use thiserror::Error;

#[derive(Debug, Error)]
pub enum RazorpayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    /// Transport failures, timeouts and gateway 5xx responses. Callers may retry with backoff.
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
    /// The gateway rejected the request itself (4xx). Retrying the same request will not help.
    #[error("Payment gateway rejected the request. Error {status}. {message}")]
    InvalidRequest { status: u16, message: String },
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
}
