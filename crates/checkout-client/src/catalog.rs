//! Plan Catalog Fetcher
//!
//! Plans are loaded once when a checkout starts. The load runs in the background
//! and is aborted if its [`PendingCatalog`] handle is dropped before it resolves.
//! Any failure degrades to an empty catalog: the checkout stays usable, it just
//! has nothing to price.

use std::sync::Arc;

use async_trait::async_trait;
use checkout_core::{Plan, PlanCatalog};
use reqwest::header::ACCEPT;
use tokio::task::JoinHandle;

use crate::config::CheckoutConfig;
use crate::error::{ClientError, Result};

/// Source of subscription plans (Strategy pattern)
#[async_trait]
pub trait PlanSource: Send + Sync {
    /// Fetch the plans currently on offer
    async fn fetch_plans(&self) -> Result<PlanCatalog>;

    /// Source name, for logs
    fn name(&self) -> &str;
}

/// Plans served as `{ "subscription_plans": [...] }` over HTTP
pub struct HttpPlanSource {
    client: reqwest::Client,
    url: String,
}

impl HttpPlanSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn from_config(config: &CheckoutConfig) -> Result<Self> {
        Ok(Self::new(config.http_client()?, config.plans_url.clone()))
    }
}

#[async_trait]
impl PlanSource for HttpPlanSource {
    async fn fetch_plans(&self) -> Result<PlanCatalog> {
        tracing::debug!(url = %self.url, "Fetching plan catalog");

        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text().await?;
        let catalog = PlanCatalog::from_json(&body)?;
        tracing::info!(plans = catalog.len(), "Loaded plan catalog");

        Ok(catalog)
    }

    fn name(&self) -> &str {
        "http"
    }
}

const DEMO_PLANS: &str = r#"{"subscription_plans":[
    {"duration_months":3,"price_usd_per_gb":3},
    {"duration_months":6,"price_usd_per_gb":2.5},
    {"duration_months":12,"price_usd_per_gb":2}
]}"#;

/// Fixed in-memory plans, for demos and offline runs
pub struct StaticPlanSource {
    catalog: PlanCatalog,
}

impl StaticPlanSource {
    pub fn new(plans: Vec<Plan>) -> Self {
        Self {
            catalog: PlanCatalog::new(plans),
        }
    }

    /// The three standard durations, cheaper per GB the longer they run
    pub fn demo() -> Self {
        Self {
            catalog: PlanCatalog::from_json(DEMO_PLANS).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl PlanSource for StaticPlanSource {
    async fn fetch_plans(&self) -> Result<PlanCatalog> {
        Ok(self.catalog.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Start loading plans in the background
pub fn spawn_catalog_load(source: Arc<dyn PlanSource>) -> PendingCatalog {
    let source_name = source.name().to_string();
    let handle = tokio::spawn(async move { source.fetch_plans().await });

    PendingCatalog {
        handle: Some(handle),
        source_name,
    }
}

/// A plan catalog still being fetched. Dropping it aborts the fetch.
pub struct PendingCatalog {
    handle: Option<JoinHandle<Result<PlanCatalog>>>,
    source_name: String,
}

impl PendingCatalog {
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the fetch, falling back to an empty catalog on failure
    pub async fn resolve(mut self) -> PlanCatalog {
        match self.wait().await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(source = %self.source_name, error = %e, "Plan catalog unavailable, continuing without plans");
                PlanCatalog::empty()
            }
        }
    }

    /// Wait for the fetch and report its failure, if any
    pub async fn wait(&mut self) -> Result<PlanCatalog> {
        // The handle stays owned by `self`, so dropping this future mid-wait
        // still aborts the task through `Drop`.
        let handle = self.handle.as_mut().ok_or(ClientError::Cancelled)?;
        let outcome = handle.await;
        self.handle = None;

        match outcome {
            Ok(result) => result,
            Err(join_error) if join_error.is_cancelled() => Err(ClientError::Cancelled),
            Err(join_error) => Err(ClientError::Task(join_error.to_string())),
        }
    }

    /// Abort the fetch now
    pub fn cancel(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                tracing::debug!(source = %self.source_name, "Aborting plan catalog fetch");
            }
            handle.abort();
        }
    }
}

impl Drop for PendingCatalog {
    fn drop(&mut self) {
        self.abort();
    }
}
