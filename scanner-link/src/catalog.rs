//! Catalog search client

use async_trait::async_trait;
use shared::models::Product;
use shared::response::ApiResponse;

use crate::error::CatalogError;

/// Product lookup seam.
///
/// The scan consumer only depends on this trait; production wires in
/// [`HttpCatalog`], tests an in-memory table.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Free-text search. A scanned code is passed verbatim as the query.
    async fn search(&self, query: &str) -> Result<Vec<Product>, CatalogError>;
}

/// HTTP implementation against the backend catalog endpoint.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CatalogLookup for HttpCatalog {
    async fn search(&self, query: &str) -> Result<Vec<Product>, CatalogError> {
        let url = format!(
            "{}/api/products/search",
            self.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::InvalidResponse(format!(
                "catalog search failed with status {status}: {body}"
            )));
        }

        let envelope: ApiResponse<Vec<Product>> = response.json().await?;
        if !envelope.is_success() {
            return Err(CatalogError::Rejected {
                code: envelope.code,
                message: envelope.message,
            });
        }

        Ok(envelope.data.unwrap_or_default())
    }
}
