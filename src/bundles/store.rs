// Client for the Bundle Configuration Store collaborator
// Bundle authoring lives in a separate service; this engine only reads
// definitions and plan tiers from it.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::bundles::models::{BundleDefinition, PlanTier};

/// Errors surfaced by the configuration store collaborator
#[derive(Debug, Error)]
pub enum BundleStoreError {
    #[error("bundle not found: {0}")]
    NotFound(String),

    #[error("configuration store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("configuration store returned {status}: {body}")]
    Remote { status: u16, body: String },
}

/// Read-side interface to the Bundle Configuration Store
#[async_trait]
pub trait BundleStore: Send + Sync {
    /// Fetch a bundle definition by id
    async fn bundle(&self, bundle_id: &str) -> Result<BundleDefinition, BundleStoreError>;

    /// Fetch the shop's subscription tier
    async fn plan_tier(&self, shop: &str) -> Result<PlanTier, BundleStoreError>;
}

/// HTTP implementation of the configuration store interface
#[derive(Clone)]
pub struct HttpBundleStore {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct PlanEnvelope {
    plan: PlanTier,
}

impl HttpBundleStore {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }
}

#[async_trait]
impl BundleStore for HttpBundleStore {
    async fn bundle(&self, bundle_id: &str) -> Result<BundleDefinition, BundleStoreError> {
        tracing::debug!("fetching bundle definition {}", bundle_id);
        let url = format!("{}/bundles/{}", self.base_url, bundle_id);
        let response = self.http.get(&url).send().await?;

        if response.status().as_u16() == 404 {
            return Err(BundleStoreError::NotFound(bundle_id.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BundleStoreError::Remote { status, body });
        }

        Ok(response.json::<BundleDefinition>().await?)
    }

    async fn plan_tier(&self, shop: &str) -> Result<PlanTier, BundleStoreError> {
        let url = format!("{}/shops/{}/plan", self.base_url, shop);
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BundleStoreError::Remote { status, body });
        }

        Ok(response.json::<PlanEnvelope>().await?.plan)
    }
}
