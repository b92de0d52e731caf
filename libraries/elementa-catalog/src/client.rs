//! HTTP catalog client.

use crate::error::{CatalogError, Result};
use crate::source::CatalogSource;
use crate::types::{ApiResponse, CatalogConfig};
use async_trait::async_trait;
use elementa_core::Item;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Header carrying the static application key
const APP_KEY_HEADER: &str = "X-APP-KEY";

/// Client for the element catalog service.
///
/// # Example
///
/// ```ignore
/// use elementa_catalog::{CatalogClient, CatalogConfig};
///
/// let config = CatalogConfig::new("https://catalog.example.org", "app-key");
/// let client = CatalogClient::new(config)?;
///
/// let items = client.fetch_items().await?;
/// println!("Loaded {} items", items.len());
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
    app_key: String,
}

impl CatalogClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(CatalogError::InvalidUrl("URL cannot be empty".into()));
        }

        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(CatalogError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(Duration::from_secs(10)))
            .user_agent(format!("Elementa/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            app_key: config.app_key,
        })
    }

    /// Get the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every element and normalize it.
    pub async fn fetch_items(&self) -> Result<Vec<Item>> {
        let url = format!("{}/api/elements", self.base_url);
        debug!(url = %url, "Fetching catalog");

        let response = self
            .http
            .get(&url)
            .header(APP_KEY_HEADER, &self.app_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    CatalogError::Unreachable(e.to_string())
                } else {
                    CatalogError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Unreachable(e.to_string())
            } else {
                CatalogError::Request(e)
            }
        })?;

        let envelope: ApiResponse = serde_json::from_slice(&body)
            .map_err(|e| CatalogError::Parse(format!("Failed to parse catalog: {}", e)))?;

        if !envelope.success {
            return Err(CatalogError::Rejected);
        }

        let items: Vec<Item> = envelope.data.into_iter().map(|e| e.into_item()).collect();
        info!(items = items.len(), "Fetched catalog");

        Ok(items)
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn load(&self) -> Result<Vec<Item>> {
        self.fetch_items().await
    }
}
