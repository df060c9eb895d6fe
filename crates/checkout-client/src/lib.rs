//! # checkout-client
//!
//! Network side of the checkout: loading the plan catalog, submitting orders,
//! and [`CheckoutSession`], which ties both to the step controller from
//! `checkout-core`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use checkout_client::{
//!     CheckoutConfig, CheckoutSession, HttpOrderSubmitter, HttpPlanSource, spawn_catalog_load,
//! };
//!
//! # async fn run() -> checkout_client::Result<()> {
//! let config = CheckoutConfig::from_env()?;
//! let pending = spawn_catalog_load(Arc::new(HttpPlanSource::from_config(&config)?));
//! let orders = Arc::new(HttpOrderSubmitter::from_config(&config)?);
//!
//! let session = CheckoutSession::new(orders).with_catalog(pending.resolve().await);
//! println!("{}", session.quote().total);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod session;
pub mod submit;

pub use catalog::{HttpPlanSource, PendingCatalog, PlanSource, StaticPlanSource, spawn_catalog_load};
pub use config::CheckoutConfig;
pub use error::{ClientError, Result};
pub use session::{CheckoutSession, SessionId};
pub use submit::{HttpOrderSubmitter, OrderReceipt, OrderSink, REQUEST_ID_HEADER};
