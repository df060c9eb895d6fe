//! Client Error Types

use checkout_core::{CheckoutError, StepError};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised at the network boundary of the checkout
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure (DNS, connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("{url} responded with HTTP {status}")]
    Status { status: u16, url: String },

    /// Plan catalog body could not be used
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Rejected step transition
    #[error("Step error: {0}")]
    Step(#[from] StepError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Background task panicked
    #[error("Background task failed: {0}")]
    Task(String),

    /// Request aborted before it resolved
    #[error("Request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Check if retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => {
                "We could not reach the order service. Please check your connection and try again."
                    .into()
            }
            ClientError::Status { status, .. } if *status >= 500 => {
                "The order service is having trouble. Please try again in a moment.".into()
            }
            ClientError::Status { .. } => "Your order was not accepted. Please review your details.".into(),
            ClientError::Step(err) => err.to_string(),
            ClientError::Cancelled => "The request was cancelled.".into(),
            _ => "An error occurred processing your order.".into(),
        }
    }
}
