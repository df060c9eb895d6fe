//! Checkout Configuration
//!
//! Endpoint URLs default to the production services and can be overridden from
//! the environment:
//!
//! | variable | default |
//! |---|---|
//! | `CHECKOUT_PLANS_URL` | [`DEFAULT_PLANS_URL`] |
//! | `CHECKOUT_ORDER_URL` | [`DEFAULT_ORDER_URL`] |
//! | `CHECKOUT_TIMEOUT_SECS` | 30 |

use std::time::Duration;

use reqwest::Url;

use crate::error::{ClientError, Result};

pub const DEFAULT_PLANS_URL: &str = "https://cloud-storage-prices-moberries.herokuapp.com/prices";
pub const DEFAULT_ORDER_URL: &str = "https://httpbin.org/post";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Endpoints and HTTP settings for a checkout
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Plan catalog endpoint (GET)
    pub plans_url: String,

    /// Order endpoint (POST)
    pub order_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            plans_url: DEFAULT_PLANS_URL.into(),
            order_url: DEFAULT_ORDER_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CheckoutConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let plans_url = lookup("CHECKOUT_PLANS_URL").unwrap_or(defaults.plans_url);
        let order_url = lookup("CHECKOUT_ORDER_URL").unwrap_or(defaults.order_url);
        let timeout_secs = match lookup("CHECKOUT_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ClientError::Config(format!("CHECKOUT_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            None => defaults.timeout_secs,
        };

        let config = Self {
            plans_url,
            order_url,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Point both endpoints at one base URL (`{base}/prices`, `{base}/post`)
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            plans_url: format!("{base}/prices"),
            order_url: format!("{base}/post"),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("CHECKOUT_PLANS_URL", &self.plans_url),
            ("CHECKOUT_ORDER_URL", &self.order_url),
        ] {
            Url::parse(url)
                .map_err(|e| ClientError::Config(format!("{name} is not a valid URL ({e}): {url}")))?;
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config("CHECKOUT_TIMEOUT_SECS must be positive".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// HTTP client for the catalog fetcher and the order submitter. Build it once
    /// and clone it into both so they share one connection pool.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout())
            .user_agent(concat!("checkout-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::from)
    }
}
