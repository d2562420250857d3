use crate::{Error, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, Proxy, StatusCode};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info};

/// HTTP client for fetching site pages and index bundle files
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a new fetcher, routing HTTPS requests through `https_proxy` when given
    pub fn new(https_proxy: Option<&str>) -> Result<Self> {
        Self::with_timeout(https_proxy, Duration::from_secs(30))
    }

    /// Creates a new fetcher with a custom request timeout (primarily for tests)
    pub fn with_timeout(https_proxy: Option<&str>, timeout: Duration) -> Result<Self> {
        // Ambient system proxies are ignored; only the configured HTTPS proxy applies.
        let mut builder = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sitedex/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .no_proxy();

        if let Some(proxy_url) = https_proxy {
            debug!(proxy = proxy_url, "routing https fetches through proxy");
            let proxy = Proxy::https(proxy_url)
                .map_err(|e| Error::InvalidUrl(format!("proxy '{proxy_url}': {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(Error::Network)?;
        Ok(Self { client })
    }

    /// Fetches a URL as text
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.checked_get(url).await?;
        let content = response.text().await?;
        info!("Fetched {} bytes from {}", content.len(), url);
        Ok(content)
    }

    /// Fetches a URL as raw bytes, returning the body and its `SHA256` digest
    pub async fn fetch_bytes(&self, url: &str) -> Result<(Vec<u8>, String)> {
        let response = self.checked_get(url).await?;
        let body = response.bytes().await?.to_vec();
        let sha256 = calculate_sha256(&body);
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok((body, sha256))
    }

    async fn checked_get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("Resource not found at '{url}'")));
        }

        // error_for_status keeps the status and URL on the reqwest error
        response.error_for_status().map_err(Error::Network)
    }
}

/// Base64-encoded `SHA256` digest, as recorded in bundle manifests
pub fn calculate_sha256(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    STANDARD.encode(hasher.finalize())
}
