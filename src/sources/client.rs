/*!
 * Shared HTTP client for every source adapter.
 *
 * One connection pool serves all workers of a stage. Transient failures
 * (429, 5xx, connection errors) are retried with exponential backoff plus
 * jitter; anything else is returned to the adapter immediately.
 */

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

use crate::app_config::SourcesConfig;
use crate::errors::SourceError;

/// Connection-pooled client handed to every adapter
///
/// Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct SourceClient {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SourceClient {
    /// Build the client from source settings
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout())
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(client, config.retry_count, config.retry_backoff_ms))
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client, max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            client,
            max_retries,
            backoff_base_ms,
        }
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Send a request built by `build`, retrying transient failures
    ///
    /// `build` is called once per attempt because request builders are
    /// consumed by `send`.
    pub async fn send_with_retry<F>(&self, source: &str, build: F) -> Result<Response, SourceError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 0;
        let mut last_error = SourceError::Request("no attempt made".to_string());

        loop {
            match build(&self.client).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    if !is_retryable_status(status) {
                        return Err(SourceError::Status { status_code: status.as_u16() });
                    }
                    last_error = SourceError::Status { status_code: status.as_u16() };
                }
                Err(e) if e.is_timeout() => {
                    return Err(SourceError::from(e));
                }
                Err(e) => {
                    last_error = SourceError::from(e);
                }
            }

            if attempt >= self.max_retries {
                return Err(last_error);
            }

            let delay = backoff_delay(self.backoff_base_ms, attempt);
            debug!(
                "{}: {} - retry {}/{} in {:?}",
                source,
                last_error,
                attempt + 1,
                self.max_retries,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Statuses worth another attempt
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

/// Exponential backoff for the given zero-based attempt, with up to 50% jitter
pub fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let exponential = base_ms.saturating_mul(1u64 << attempt.min(16));
    let jitter = if base_ms > 1 {
        rand::random_range(0..=base_ms / 2)
    } else {
        0
    };
    Duration::from_millis(exponential.saturating_add(jitter))
}
