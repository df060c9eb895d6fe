//! Order Submitter
//!
//! Posts a validated [`OrderPayload`] as JSON. Any 2xx response counts as
//! accepted; the body is not inspected.

use async_trait::async_trait;
use checkout_core::OrderPayload;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::CheckoutConfig;
use crate::error::{ClientError, Result};

/// Header carrying the per-submission request id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Acknowledgement of an accepted order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub request_id: Uuid,
    pub status: u16,
}

/// Destination for confirmed orders (Strategy pattern)
#[async_trait]
pub trait OrderSink: Send + Sync {
    async fn submit(&self, order: &OrderPayload) -> Result<OrderReceipt>;

    /// Sink name, for logs
    fn name(&self) -> &str;
}

/// Orders posted to an HTTP endpoint
pub struct HttpOrderSubmitter {
    client: reqwest::Client,
    url: String,
}

impl HttpOrderSubmitter {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn from_config(config: &CheckoutConfig) -> Result<Self> {
        Ok(Self::new(config.http_client()?, config.order_url.clone()))
    }
}

#[async_trait]
impl OrderSink for HttpOrderSubmitter {
    #[tracing::instrument(skip_all, fields(url = %self.url))]
    async fn submit(&self, order: &OrderPayload) -> Result<OrderReceipt> {
        let request_id = Uuid::new_v4();
        tracing::info!(%request_id, order = ?order, "Submitting order");

        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(order)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%request_id, status = status.as_u16(), "Order rejected");
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        tracing::info!(%request_id, status = status.as_u16(), "Order accepted");
        Ok(OrderReceipt {
            request_id,
            status: status.as_u16(),
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
