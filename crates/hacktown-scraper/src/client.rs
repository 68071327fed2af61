//! HTTP client for the HackTown public schedule endpoint.
//!
//! [`ScheduleClient::fetch_page`] wraps one `(date, page)` request in the
//! retry/backoff state machine from [`crate::backoff`]: randomized jitter
//! before every attempt, a freshly sampled header fingerprint per attempt,
//! and per-failure-class delays. Exhausting all attempts reports the page as
//! unavailable (`None`) rather than failing the caller.

use std::time::Duration;

use hacktown_core::RunConfig;

use crate::backoff::{self, RetryDecision};
use crate::error::FetchError;
use crate::headers::HeaderPool;
use crate::types::SchedulePage;

/// Production schedule endpoint.
pub const SCHEDULE_ENDPOINT: &str =
    "https://hacktown-2025-ss-v2.api.yazo.com.br/public/schedules";

/// Event portal root, used for session warm-up.
pub const PORTAL_URL: &str = "https://hacktown2025.yazo.app.br/";

/// HTTP client owning the connection pool, the header pool, and the retry
/// policy for one run.
pub struct ScheduleClient {
    client: reqwest::Client,
    config: RunConfig,
    headers: HeaderPool,
    schedule_url: String,
    portal_url: String,
}

impl ScheduleClient {
    /// Creates a client against the production endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: RunConfig) -> Result<Self, FetchError> {
        Self::with_endpoints(config, SCHEDULE_ENDPOINT, PORTAL_URL)
    }

    /// Creates a client against arbitrary endpoints. Exists for integration
    /// tests that point at a local mock server.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_endpoints(
        config: RunConfig,
        schedule_url: &str,
        portal_url: &str,
    ) -> Result<Self, FetchError> {
        let connect_timeout = if config.constrained { 30 } else { 10 };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout))
            .pool_max_idle_per_host(config.pool_limit_per_host)
            .build()?;
        Ok(Self {
            client,
            config,
            headers: HeaderPool::new(),
            schedule_url: schedule_url.to_owned(),
            portal_url: portal_url.to_owned(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Fetches one page of events for one date, retrying per the active
    /// profile's backoff policy.
    ///
    /// Returns `None` once all attempts are spent or a non-retriable failure
    /// occurs. That is a reported failure, not a fatal one: the caller
    /// decides what a missing page means for its date.
    pub async fn fetch_page(&self, date: &str, page: u32) -> Option<SchedulePage> {
        let mut attempt = 0u32;
        loop {
            tokio::time::sleep(backoff::pre_request_jitter(&self.config, attempt)).await;

            match self.fetch_page_once(date, page).await {
                Ok(parsed) => {
                    tracing::info!(date, page, attempt, events = parsed.data.len(), "fetched page");
                    return Some(parsed);
                }
                Err(err) => {
                    let attempts_remaining = attempt + 1 < self.config.max_retries;
                    let class = backoff::classify(&err);
                    match backoff::decide(&self.config, class, attempt, attempts_remaining) {
                        RetryDecision::RetryAfter(delay) => {
                            tracing::warn!(
                                date,
                                page,
                                attempt,
                                max_retries = self.config.max_retries,
                                delay_secs = delay.as_secs_f64(),
                                error = %err,
                                "transient fetch error — retrying after backoff"
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        RetryDecision::GiveUp => {
                            tracing::error!(
                                date,
                                page,
                                attempt,
                                error = %err,
                                "giving up on page"
                            );
                            return None;
                        }
                    }
                }
            }
        }
    }

    /// One raw attempt: build the query, send, classify the status, parse.
    async fn fetch_page_once(&self, date: &str, page: u32) -> Result<SchedulePage, FetchError> {
        let page_str = page.to_string();
        // Query shape observed from the official web app.
        let params: [(&str, &str); 7] = [
            ("category_id", "42"),
            ("tag_ids", "[]"),
            ("day[]", date),
            ("day[]", "00:00:00.000Z"),
            ("page", &page_str),
            ("search", ""),
            ("product_ids", "[2]"),
        ];

        let response = self
            .client
            .get(&self.schedule_url)
            .headers(self.headers.sample())
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(FetchError::RateLimited {
                date: date.to_owned(),
                page,
            });
        }
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                date: date.to_owned(),
                page,
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<SchedulePage>(&body).map_err(|e| FetchError::Deserialize {
            context: format!("schedule page {page} for {date}"),
            source: e,
        })
    }

    /// Best-effort warm-up request against the portal root so the first real
    /// API call does not arrive on a cold fingerprint. Failures are logged
    /// and swallowed.
    pub async fn warm_up(&self) {
        tracing::info!(url = %self.portal_url, "warming up session against portal root");
        let result = self
            .client
            .get(&self.portal_url)
            .headers(self.headers.sample())
            .timeout(Duration::from_secs(15))
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!("session warm-up succeeded");
                // Brief pause to look like a human moving from the portal to
                // the schedule view.
                tokio::time::sleep(backoff::uniform(2.0, 5.0)).await;
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "session warm-up returned non-success");
            }
            Err(err) => {
                tracing::warn!(error = %err, "session warm-up failed");
            }
        }
    }
}
