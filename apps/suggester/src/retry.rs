// Shared send-with-backoff for the outbound HTTP clients (embeddings, rewrite LLM).
// Transient failures are 429, 5xx, timeouts and connect errors; anything else
// is returned on the first attempt.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use thiserror::Error;
use tracing::warn;

const MAX_BACKOFF_DOUBLINGS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total tries per request, first one included. Zero is treated as one.
    pub max_attempts: u32,
    /// Wait before the first retry; doubled on each further retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay after the given failed attempt (1-based).
    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        let doublings = failed_attempt.saturating_sub(1).min(MAX_BACKOFF_DOUBLINGS);
        self.base_delay * (1u32 << doublings)
    }
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("status {status} after {attempts} attempt(s): {body}")]
    Status {
        status: StatusCode,
        body: String,
        attempts: u32,
    },
}

pub fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Sends the request built by `build` until it succeeds, fails permanently,
/// or `policy.max_attempts` is spent. Returns the last failure when exhausted.
pub async fn send_with_retry<F>(
    policy: &RetryPolicy,
    label: &str,
    build: F,
) -> Result<Response, SendError>
where
    F: Fn() -> RequestBuilder,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let failure = match build().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let failure = SendError::Status {
                    status,
                    body,
                    attempts: attempt,
                };
                if !is_transient(status) {
                    return Err(failure);
                }
                failure
            }
            Err(e) if e.is_timeout() || e.is_connect() => SendError::Http(e),
            Err(e) => return Err(SendError::Http(e)),
        };

        if attempt >= max_attempts {
            return Err(failure);
        }
        let delay = policy.backoff(attempt);
        warn!(
            "{label} attempt {attempt}/{max_attempts} failed ({failure}), retrying after {}ms",
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
