//! checkout: terminal front end for the cloud-storage subscription checkout
//!
//! Plans are fetched in the background while the terminal starts up. Logs go
//! to stderr so the prompts on stdout stay readable.
//!
//! Pass `--offline` to use the built-in demo plans instead of the plans endpoint.

mod prompt;
mod render;
mod wizard;

use std::sync::Arc;

use checkout_client::{
    CheckoutConfig, CheckoutSession, HttpOrderSubmitter, HttpPlanSource, PlanSource,
    StaticPlanSource, spawn_catalog_load,
};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::wizard::Wizard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment first so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CheckoutConfig::from_env()?;
    let offline = std::env::args().skip(1).any(|arg| arg == "--offline");

    let http = config.http_client()?;

    let plans: Arc<dyn PlanSource> = if offline {
        Arc::new(StaticPlanSource::demo())
    } else {
        Arc::new(HttpPlanSource::new(http.clone(), config.plans_url.clone()))
    };
    tracing::info!(
        plans = plans.name(),
        plans_url = %config.plans_url,
        order_url = %config.order_url,
        "Starting checkout"
    );

    let pending = spawn_catalog_load(plans);
    let orders = Arc::new(HttpOrderSubmitter::new(http, config.order_url.clone()));

    // Ctrl-C drops the pending load, which aborts the request
    let catalog = tokio::select! {
        catalog = pending.resolve() => catalog,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted while loading plans");
            return Ok(());
        }
    };

    let session = CheckoutSession::new(orders).with_catalog(catalog);
    tracing::debug!(session = %session.id(), "Session started");

    let mut wizard = Wizard::new(session, BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    tokio::select! {
        result = wizard.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
    }

    Ok(())
}
