//! HTTP transport with bounded retry on transient failures.
//!
//! The transport never interprets bodies. It hands back status, headers and
//! raw bytes, or a [`TransportError`] once the attempt budget is spent on
//! network-level failures.

use std::{fmt::Debug, future::Future, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{
    Client,
    header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER},
};
use tracing::{debug, error, warn};

use crate::error::TransportError;

/// Response as received, after any retries.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, headers: HeaderMap::new(), body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// `Retry-After` in delta-seconds form; HTTP-date values are ignored.
    pub fn retry_after(&self) -> Option<Duration> {
        self.headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }
}

#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// GET `url` with `query` appended, bounded by `timeout` per attempt.
    async fn send(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<RawResponse, TransportError>;
}

/// When and how long to wait before another attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each one after.
    pub backoff_factor: Duration,
    pub max_backoff: Duration,
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_factor: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    pub fn retries_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Exponential delay before retry number `retry` (1-based), capped.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        self.backoff_factor.saturating_mul(1 << exp).min(self.max_backoff)
    }

    fn delay_for(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(d) => d.min(self.max_backoff),
            None => self.backoff(retry),
        }
    }

    /// Drive `attempt` until it yields a non-retryable outcome or the budget
    /// is spent. A retryable status on the last attempt is returned as-is.
    pub async fn run<F, Fut>(&self, mut attempt: F) -> Result<RawResponse, TransportError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<RawResponse, TransportError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut tried = 1;

        loop {
            debug!(attempt = tried, max_attempts, "sending request");
            let outcome = attempt(tried).await;

            let retry_after = match &outcome {
                Ok(resp) if self.retries_status(resp.status) => {
                    // 413/429/503 are the statuses that carry Retry-After.
                    if matches!(resp.status, 413 | 429 | 503) {
                        resp.retry_after()
                    } else {
                        None
                    }
                }
                Err(err) if err.is_transient() => None,
                _ => return outcome,
            };

            if tried >= max_attempts {
                match &outcome {
                    Ok(resp) => {
                        error!(attempts = tried, status = resp.status, "retries exhausted")
                    }
                    Err(err) => error!(attempts = tried, error = %err, "retries exhausted"),
                }
                return outcome;
            }

            let delay = self.delay_for(tried, retry_after);
            warn!(
                attempt = tried,
                delay_ms = delay.as_millis() as u64,
                "transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
            tried += 1;
        }
    }
}

/// `reqwest`-backed transport. Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    policy: RetryPolicy,
}

impl HttpTransport {
    pub fn new(policy: RetryPolicy) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("weather-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, policy })
    }

    async fn attempt(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let res = self
            .http
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_reqwest(e, timeout))?;

        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let body = res.bytes().await.map_err(|e| classify_reqwest(e, timeout))?;

        debug!(url, status, bytes = body.len(), "response received");

        Ok(RawResponse { status, headers, body: body.to_vec() })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        self.policy.run(|_| self.attempt(url, query, timeout)).await
    }
}

/// The URL is stripped from the error: its query carries the API key.
fn classify_reqwest(err: reqwest::Error, timeout: Duration) -> TransportError {
    let err = err.without_url();
    // Connect timeouts report both flags; the timeout wins.
    if err.is_timeout() {
        TransportError::Timeout(timeout)
    } else if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}
