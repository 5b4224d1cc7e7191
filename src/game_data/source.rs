// Where table bodies come from: the backend's static data mount over HTTP.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::metrics;

/// Fetches the raw text of a data resource by its path under `/api/data/`.
#[async_trait]
pub trait TableSource: Send + Sync {
    async fn fetch_text(&self, resource_path: &str) -> Result<String>;
}

/// HTTP source backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTableSource {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpTableSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Full URL of a data resource.
    pub fn resource_url(&self, resource_path: &str) -> String {
        format!("{}/api/data/{}", self.base_url, resource_path)
    }
}

#[async_trait]
impl TableSource for HttpTableSource {
    async fn fetch_text(&self, resource_path: &str) -> Result<String> {
        let url = self.resource_url(resource_path);
        tracing::debug!("GET {url}");

        let network = |source| Error::Network {
            resource: resource_path.to_string(),
            source,
        };
        let response = self.http_client.get(&url).send().await.map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                resource: resource_path.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(network)?;
        metrics::DATA_BYTES_FETCHED_TOTAL.inc_by(text.len() as u64);
        Ok(text)
    }
}
