//! Named-entity recognition over HTTP.

use crate::config::NerConfig;
use crate::error::{ForumError, Result};
use crate::metrics::content::NER_REQUEST_DURATION_SECONDS;
use crate::models::{EntitySpan, NerRequest, NerResponse};
use async_trait::async_trait;
use rand::Rng;
use reqwest::Client as HttpClient;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const SERVICE: &str = "ner";

/// Detects named entities in text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Spans over `text` exactly as passed in.
    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>>;
}

/// Backoff policy for transient NER failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    /// ±30% random jitter on every delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    fn delay(&self, base: Duration) -> Duration {
        if !self.jitter {
            return base;
        }
        let factor = 1.0 + rand::thread_rng().gen_range(-0.3..0.3);
        Duration::from_millis((base.as_millis() as f64 * factor) as u64)
    }

    fn next_backoff(&self, current: Duration) -> Duration {
        let next = current.as_millis() as f64 * self.backoff_multiplier;
        Duration::from_millis(next.min(self.max_backoff.as_millis() as f64) as u64)
    }
}

/// Outcome of a single attempt. Only transient failures are retried.
enum AttemptError {
    Transient(String),
    Fatal(String),
}

impl AttemptError {
    fn reason(&self) -> &str {
        match self {
            AttemptError::Transient(reason) | AttemptError::Fatal(reason) => reason,
        }
    }
}

/// Client for the NER endpoint: POSTs `{"sentence": ..}` and reads
/// `{"result": [{"type", "start_index", "end_index"}]}`.
pub struct NerClient {
    client: HttpClient,
    api_url: String,
    api_token: String,
    retry: RetryPolicy,
}

impl NerClient {
    pub fn new(config: &NerConfig) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ForumError::Config(format!("Failed to create NER HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_token: config.api_token.clone(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                ..Default::default()
            },
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn attempt(&self, text: &str) -> std::result::Result<Vec<EntitySpan>, AttemptError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Accept", "application/json")
            .header("token", &self.api_token)
            .json(&NerRequest { sentence: text })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AttemptError::Transient(format!("request timed out: {}", e))
                } else {
                    AttemptError::Transient(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = format!("unexpected status {}: {}", status, body);
            return Err(if status.is_server_error() {
                AttemptError::Transient(reason)
            } else {
                AttemptError::Fatal(reason)
            });
        }

        let parsed: NerResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AttemptError::Transient(format!("response timed out: {}", e))
            } else {
                AttemptError::Fatal(format!("malformed response body: {}", e))
            }
        })?;

        Ok(parsed.result)
    }
}

#[async_trait]
impl EntityRecognizer for NerClient {
    async fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let mut attempt = 0;
        let mut backoff = self.retry.initial_backoff;

        loop {
            let started = Instant::now();
            let result = self.attempt(text).await;
            let elapsed = started.elapsed().as_secs_f64();

            match result {
                Ok(spans) => {
                    NER_REQUEST_DURATION_SECONDS
                        .with_label_values(&["success"])
                        .observe(elapsed);
                    debug!(spans = spans.len(), "NER request succeeded");
                    return Ok(spans);
                }
                Err(err) => {
                    NER_REQUEST_DURATION_SECONDS
                        .with_label_values(&["error"])
                        .observe(elapsed);

                    let retryable = matches!(err, AttemptError::Transient(_));
                    if !retryable || attempt >= self.retry.max_retries {
                        return Err(ForumError::external(SERVICE, err.reason()));
                    }

                    attempt += 1;
                    let delay = self.retry.delay(backoff);
                    warn!(
                        attempt,
                        max_retries = self.retry.max_retries,
                        reason = %err.reason(),
                        "NER request failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    backoff = self.retry.next_backoff(backoff);
                }
            }
        }
    }
}
