//! Jikan API gateway with request pacing and a single 429 retry.

use super::endpoint::Endpoint;
use super::error::{GatewayError, Result};
use super::rate_limiter::{Pacer, DEFAULT_MIN_INTERVAL};
use super::types::{AnimeData, DataResponse, JikanErrorBody, PaginatedResponse};
use anyhow::Context;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::GatewayConfig;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Default base URL for Jikan API v4.
pub const DEFAULT_BASE_URL: &str = "https://api.jikan.moe/v4";

/// Wait after a 429 before resubmitting.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(2000);

/// Automatic retries allowed after a 429.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Transport timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on a server-supplied `Retry-After` wait.
pub const DEFAULT_MAX_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Rate-limited gateway to the Jikan API.
///
/// Owns all outbound calls: every request takes a pacing turn first, so
/// dispatches stay at least `min_interval` apart no matter how many tasks
/// share the gateway. Separate instances pace independently.
#[derive(Debug)]
pub struct JikanGateway {
    /// HTTP client
    client: Client,
    /// Base URL without trailing slash
    base_url: String,
    /// Dispatch pacing
    pacer: Pacer,
    /// Fixed wait after a 429 response
    retry_backoff: Duration,
    /// Automatic retries after a 429 response
    max_retries: u32,
    /// Prefer the server's Retry-After over `retry_backoff`
    honor_retry_after: bool,
    /// Cap on a honored Retry-After wait
    max_retry_after: Duration,
}

/// Builder for `JikanGateway`.
#[derive(Debug, Clone)]
pub struct JikanGatewayBuilder {
    base_url: String,
    min_interval: Duration,
    retry_backoff: Duration,
    max_retries: u32,
    timeout: Duration,
    user_agent: String,
    honor_retry_after: bool,
    max_retry_after: Duration,
}

impl Default for JikanGatewayBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_interval: DEFAULT_MIN_INTERVAL,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("jikan-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
            honor_retry_after: false,
            max_retry_after: DEFAULT_MAX_RETRY_AFTER,
        }
    }
}

impl JikanGatewayBuilder {
    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    #[must_use]
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    #[must_use]
    pub fn honor_retry_after(mut self, honor: bool) -> Self {
        self.honor_retry_after = honor;
        self
    }

    /// Caps how long a server-supplied `Retry-After` may stall a caller.
    #[must_use]
    pub fn max_retry_after(mut self, cap: Duration) -> Self {
        self.max_retry_after = cap;
        self
    }

    /// Builds the gateway.
    ///
    /// # Errors
    ///
    /// - `base_url` is empty.
    /// - `timeout` is zero.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> anyhow::Result<JikanGateway> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            anyhow::bail!("base_url is required");
        }
        if self.timeout.is_zero() {
            anyhow::bail!("timeout must be greater than zero");
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(JikanGateway {
            client,
            base_url,
            pacer: Pacer::new(self.min_interval),
            retry_backoff: self.retry_backoff,
            max_retries: self.max_retries,
            honor_retry_after: self.honor_retry_after,
            max_retry_after: self.max_retry_after,
        })
    }
}

impl JikanGateway {
    /// Creates a new builder with the Jikan defaults.
    #[must_use]
    pub fn builder() -> JikanGatewayBuilder {
        JikanGatewayBuilder::default()
    }

    /// Create a gateway from the `[gateway]` config section
    pub fn from_config(config: &GatewayConfig) -> anyhow::Result<Self> {
        Self::builder()
            .base_url(config.base_url.clone())
            .min_interval(config.min_interval())
            .retry_backoff(config.retry_backoff())
            .max_retries(config.max_retries)
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .honor_retry_after(config.honor_retry_after)
            .max_retry_after(config.max_retry_after())
            .build()
    }

    /// Configured minimum interval between dispatches
    pub fn min_interval(&self) -> Duration {
        self.pacer.min_interval()
    }

    /// Make a paced GET request and decode the body.
    ///
    /// A 429 response is retried after the back-off, at most `max_retries`
    /// times, each retry taking a fresh pacing turn. Every other failure is
    /// logged and returned as-is.
    pub async fn request<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let query = endpoint.query();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            self.pacer.turn().await;

            debug!(endpoint = %endpoint, attempt = attempt, "Making API request");

            let response = match self.client.get(&url).query(&query).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "Request error");
                    return Err(GatewayError::Transport {
                        endpoint: endpoint.to_string(),
                        source: e,
                    });
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt > self.max_retries {
                    warn!(
                        endpoint = %endpoint,
                        attempts = attempt,
                        "Rate limited by server, retry exhausted"
                    );
                    return Err(GatewayError::RateLimited {
                        endpoint: endpoint.to_string(),
                        attempts: attempt,
                    });
                }

                let delay = self.backoff_for(&response);
                // Release the connection before waiting
                drop(response);
                warn!(
                    endpoint = %endpoint,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited by server, waiting before retry"
                );
                sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                let message = serde_json::from_str::<JikanErrorBody>(&body)
                    .map(|e| e.message)
                    .unwrap_or_else(|_| body.clone());

                warn!(
                    endpoint = %endpoint,
                    status = %status,
                    error = %message,
                    "Request failed"
                );
                return Err(GatewayError::Status {
                    endpoint: endpoint.to_string(),
                    status,
                    body,
                });
            }

            let bytes = match response.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "Failed to read response body");
                    return Err(GatewayError::Transport {
                        endpoint: endpoint.to_string(),
                        source: e,
                    });
                }
            };

            return match serde_json::from_slice::<T>(&bytes) {
                Ok(data) => {
                    debug!(endpoint = %endpoint, "Request successful");
                    Ok(data)
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "Failed to parse response");
                    Err(GatewayError::Decode {
                        endpoint: endpoint.to_string(),
                        source: e,
                    })
                }
            };
        }
    }

    /// Wait before resubmitting a rate-limited request
    fn backoff_for(&self, response: &Response) -> Duration {
        if !self.honor_retry_after {
            return self.retry_backoff;
        }
        response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(|secs| Duration::from_secs(secs).min(self.max_retry_after))
            .unwrap_or(self.retry_backoff)
    }

    /// Fetch top-ranked anime
    pub async fn top_anime(&self, page: u32, limit: u32) -> Result<PaginatedResponse<AnimeData>> {
        let endpoint = Endpoint::top_anime(page, limit)?;
        info!(page = page, limit = limit, "Fetching top anime");
        self.request(&endpoint).await
    }

    /// Fetch upcoming season anime
    pub async fn upcoming_anime(&self, page: u32) -> Result<PaginatedResponse<AnimeData>> {
        let endpoint = Endpoint::upcoming_season(page)?;
        info!(page = page, "Fetching upcoming anime");
        self.request(&endpoint).await
    }

    /// Search anime by free text
    pub async fn search_anime(
        &self,
        query: &str,
        page: u32,
    ) -> Result<PaginatedResponse<AnimeData>> {
        let endpoint = Endpoint::search(query, page)?;
        info!(query = query.trim(), page = page, "Searching anime");
        self.request(&endpoint).await
    }

    /// Fetch full anime details by MAL ID
    pub async fn anime_by_id(&self, mal_id: u32) -> Result<DataResponse<AnimeData>> {
        let endpoint = Endpoint::anime_full(mal_id)?;
        debug!(mal_id = mal_id, "Fetching anime details");
        self.request(&endpoint).await
    }

    /// Fetch full anime details from an unparsed identifier.
    ///
    /// Anything that is not a positive integer fails with
    /// [`GatewayError::InvalidId`] before touching the network.
    pub async fn lookup_anime(&self, raw_id: &str) -> Result<DataResponse<AnimeData>> {
        let endpoint = Endpoint::anime_full_from_str(raw_id)?;
        debug!(raw_id = raw_id, "Fetching anime details");
        self.request(&endpoint).await
    }

    /// Fetch anime airing this season
    pub async fn current_season_anime(&self, page: u32) -> Result<PaginatedResponse<AnimeData>> {
        let endpoint = Endpoint::current_season(page)?;
        info!(page = page, "Fetching current season anime");
        self.request(&endpoint).await
    }
}
