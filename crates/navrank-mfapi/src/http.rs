//! Shared HTTP plumbing: pooled client, retries with exponential backoff.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{Result, error::MfApiError};

/// Connection and retry settings shared by the API clients.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt for transient failures.
    pub retries: u32,
    /// Delay before the first retry; doubled on every further retry.
    pub backoff: Duration,
    /// Idle connections kept per host.
    pub pool_size: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retries: 3,
            backoff: Duration::from_millis(500),
            pool_size: 25,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HttpFetcher {
    client: Client,
    config: HttpConfig,
}

impl HttpFetcher {
    pub(crate) fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_size)
            .build()?;
        Ok(Self { client, config })
    }

    pub(crate) const fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// GET `url` and decode the JSON body.
    ///
    /// `Ok(None)` for 404 and for empty bodies. 5xx gateway errors and
    /// transport failures are retried; other statuses fail immediately.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        let attempts = self.config.retries + 1;
        let mut last = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.config.backoff.saturating_mul(2u32.saturating_pow(attempt - 1));
                debug!(url, attempt, delay_ms = delay.as_millis() as u64, "retrying request");
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() || e.is_connect() => {
                    last = e.to_string();
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if is_retryable(status) {
                last = format!("HTTP {status}");
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(MfApiError::Status {
                    status: status.as_u16(),
                    body: truncate(&body, 200),
                });
            }

            let text = response.text().await?;
            return parse_body(&text);
        }

        warn!(url, attempts, last = %last, "request failed after retries");
        Err(MfApiError::RetriesExhausted {
            url: url.to_string(),
            attempts,
            last,
        })
    }
}

pub(crate) fn is_retryable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

pub(crate) fn parse_body<T: DeserializeOwned>(text: &str) -> Result<Option<T>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
