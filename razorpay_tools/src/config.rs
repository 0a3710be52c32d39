use std::time::Duration;

use gmk_common::Secret;
use log::*;

pub const DEFAULT_RAZORPAY_API_URL: &str = "https://api.razorpay.com";
pub const DEFAULT_RAZORPAY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: Secret<String>,
    /// Shared secret for webhook signature verification. `None` when unconfigured, which the
    /// server treats as a fatal startup condition.
    pub webhook_secret: Option<Secret<String>>,
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            key_id: String::default(),
            key_secret: Secret::default(),
            webhook_secret: None,
            api_url: DEFAULT_RAZORPAY_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_RAZORPAY_TIMEOUT_SECS),
        }
    }
}

impl RazorpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let key_id = std::env::var("GMK_RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            warn!("🪛️ GMK_RAZORPAY_KEY_ID is not set, using a (probably useless) default");
            "rzp_test_0000000000".to_string()
        });
        let key_secret = Secret::new(std::env::var("GMK_RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ GMK_RAZORPAY_KEY_SECRET is not set, using a (probably useless) default");
            "00000000000000".to_string()
        }));
        let webhook_secret =
            std::env::var("GMK_RAZORPAY_WEBHOOK_SECRET").ok().filter(|s| !s.is_empty()).map(Secret::new);
        if webhook_secret.is_none() {
            warn!(
                "🪛️ GMK_RAZORPAY_WEBHOOK_SECRET is not set. The server cannot verify webhook calls and will refuse \
                 to start."
            );
        }
        let api_url = std::env::var("GMK_RAZORPAY_API_URL").unwrap_or_else(|_| DEFAULT_RAZORPAY_API_URL.to_string());
        let timeout = std::env::var("GMK_RAZORPAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RAZORPAY_TIMEOUT_SECS);
        Self { key_id, key_secret, webhook_secret, api_url, timeout: Duration::from_secs(timeout) }
    }
}
