//! HTTP client for Amazon item lookups using wreq for TLS fingerprint emulation.

use crate::amazon::models::{LookupError, LookupRequest, LookupResponse};
use crate::amazon::parser::Parser;
use crate::amazon::regions::Region;
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Looks up one item on the marketplace - enables mocking for tests.
#[async_trait]
pub trait ItemLookup: Send + Sync {
    /// Fetches title, author and lowest offers for an item.
    async fn lookup(&self, request: &LookupRequest) -> Result<LookupResponse, LookupError>;

    /// Returns the configured region.
    fn region(&self) -> Region;
}

/// Amazon HTTP client with browser impersonation and request pacing.
pub struct AmazonClient {
    client: Client,
    parser: Parser,
    region: Region,
    delay_ms: u64,
    delay_jitter_ms: u64,
    base_url: Option<String>,
}

impl AmazonClient {
    /// Creates a new Amazon client with the given configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, None).await
    }

    /// Creates a new Amazon client with an optional custom base URL (for testing).
    pub async fn with_base_url(config: &Config, base_url: Option<String>) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            parser: Parser::new(config.region),
            region: config.region,
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
            base_url,
        })
    }

    /// Returns the base URL (custom for testing, or region-based for production).
    fn base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| self.region.base_url())
    }

    /// Performs a GET request and classifies any failure.
    async fn get(&self, url: &str, item_id: &str) -> Result<String, LookupError> {
        self.delay().await;

        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8")
            .header("Accept-Language", self.region.accept_language())
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        debug!("Response status: {}", status);

        if status == 503 || status == 429 {
            warn!("Rate limited ({}) while fetching {}", status, item_id);
        }

        if !response.status().is_success() {
            return Err(LookupError::from_status(status, item_id));
        }

        let final_url = response.uri().to_string();
        if !final_url.contains(self.region.domain()) && self.base_url.is_none() {
            warn!(
                "Redirected to different domain: {}. Your IP may be associated with a different region.",
                final_url
            );
        }

        response.text().await.map_err(|e| LookupError::Network(e.to_string()))
    }

    /// Waits between requests so the marketplace's request rate is respected.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl ItemLookup for AmazonClient {
    async fn lookup(&self, request: &LookupRequest) -> Result<LookupResponse, LookupError> {
        let url = format!("{}/dp/{}", self.base_url(), request.item_id);

        debug!("Looking up {} {}", request.id_kind, request.item_id);
        let html = self.get(&url, &request.item_id).await?;
        self.parser.parse_item(&html, &request.item_id)
    }

    fn region(&self) -> Region {
        self.region
    }
}
