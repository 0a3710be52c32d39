use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::RazorpayConfig,
    data_objects::{NewPaymentIntent, PaymentIntent},
    RazorpayApiError,
};

/// Thin client over the Razorpay REST API. Holds no state besides the connection pool, so an
/// abandoned intent leaves nothing behind on our side.
#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, RazorpayApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()));
        if let Some(body) = body {
            req = req.json(&body);
        }
        // Connection failures and timeouts are retryable from the caller's point of view.
        let response = req.send().await.map_err(|e| RazorpayApiError::GatewayUnavailable(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            trace!("REST query successful. {status}");
            response.json::<T>().await.map_err(|e| RazorpayApiError::JsonError(e.to_string()))
        } else {
            let message = response.text().await.unwrap_or_default();
            if status.is_server_error() {
                Err(RazorpayApiError::GatewayUnavailable(format!("Gateway returned {status}. {message}")))
            } else {
                Err(RazorpayApiError::InvalidRequest { status: status.as_u16(), message })
            }
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url.trim_end_matches('/'))
    }

    /// The public half of the API key pair. Safe to hand to frontends, which need it to open the
    /// checkout widget.
    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    /// Creates a payment intent (a Razorpay "order") that the client completes out of band. The
    /// buyer and gig travel along as notes so the capture webhook arrives with full context.
    pub async fn create_payment_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, RazorpayApiError> {
        debug!("Creating a payment intent of {} for gig {}", intent.amount, intent.notes.gig_id);
        let result = self.rest_query::<PaymentIntent, NewPaymentIntent>(Method::POST, "/orders", Some(intent)).await?;
        info!("Created payment intent {} for {}", result.id, result.amount);
        Ok(result)
    }
}
