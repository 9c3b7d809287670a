//! HTTP client for the remote promo catalog.
//!
//! `HttpCatalogClient` performs a single GET per call and classifies the
//! outcome into `FetchError`. It never retries and never caches.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, warn};

use crate::models::Catalog;

use super::FetchError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// The catalog is a small static document, so 30s is generous.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Extra time the HTTP client allows past a caller's deadline, so a hung
/// request surfaces as `FetchError::Timeout` from the caller and not as a
/// transport error from reqwest.
pub const DEADLINE_GRACE: Duration = Duration::from_secs(5);

/// Anything that can produce a catalog for a URL.
///
/// The service only talks to this trait, which keeps the network out of
/// orchestration tests.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch and decode the catalog at `url`. Exactly one attempt.
    async fn fetch_catalog(&self, url: &str) -> Result<Catalog, FetchError>;

    /// Source identifier for logging
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Catalog source backed by reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: Client,
}

impl HttpCatalogClient {
    /// Create a client with the default request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Client for callers that enforce `deadline` themselves.
    pub fn for_deadline(deadline: Duration) -> Result<Self> {
        Self::with_timeout(deadline + DEADLINE_GRACE)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Reject non-2xx responses before the body is read.
    fn check_response(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(FetchError::from_status(status))
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn fetch_catalog(&self, url: &str) -> Result<Catalog, FetchError> {
        debug!(url = url, "Fetching catalog");

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(url = url, error = %e, "Catalog request failed");
                FetchError::from(e)
            })?;

        let response = Self::check_response(response).map_err(|e| {
            warn!(url = url, error = %e, "Catalog request rejected");
            e
        })?;

        let body = response.bytes().await?;
        let catalog = Catalog::from_slice(&body).map_err(|e| {
            warn!(url = url, error = %e, "Failed to decode catalog");
            FetchError::from(e)
        })?;

        debug!(url = url, apps = catalog.apps.len(), "Fetched catalog");
        Ok(catalog)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
