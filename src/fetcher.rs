use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::types::Category;

/// Why an upstream fetch was abandoned. Never reaches the HTTP client;
/// the fetcher swaps in fallback numbers instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamUnavailable {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("malformed body: {0}")]
    MalformedBody(String),
}

/// Result of asking the provider for a category's numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The provider answered in time with a well-formed body.
    Fresh(Vec<i64>),
    /// The provider failed; `numbers` is the category's static fallback.
    Fallback {
        numbers: Vec<i64>,
        reason: UpstreamUnavailable,
    },
}

impl FetchOutcome {
    pub fn numbers(&self) -> &[i64] {
        match self {
            FetchOutcome::Fresh(n) => n,
            FetchOutcome::Fallback { numbers, .. } => numbers,
        }
    }

    pub fn into_numbers(self) -> Vec<i64> {
        match self {
            FetchOutcome::Fresh(n) => n,
            FetchOutcome::Fallback { numbers, .. } => numbers,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FetchOutcome::Fallback { .. })
    }
}

/// `numbers` may be missing or null; both mean "no numbers this time".
#[derive(Debug, Deserialize)]
struct UpstreamBody {
    #[serde(default)]
    numbers: Option<Vec<i64>>,
}

/// Single-attempt client for the numbers provider. Cheap to share: the inner
/// `reqwest::Client` is a connection pool behind an `Arc`.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.upstream_base_url.clone(), cfg.upstream_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `{base_url}/{resource}` with a hard deadline. No retries.
    ///
    /// The deadline covers connect, headers and body. When it fires the request
    /// future is dropped, which aborts the in-flight connection.
    pub async fn fetch(&self, resource: &str) -> std::result::Result<Vec<i64>, UpstreamUnavailable> {
        let url = format!("{}/{}", self.base_url, resource);
        match tokio::time::timeout(self.timeout, self.request(&url)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamUnavailable::Timeout(self.timeout)),
        }
    }

    /// Fetch a category's numbers, substituting its fallback on any failure.
    pub async fn fetch_or_fallback(&self, category: Category) -> FetchOutcome {
        match self.fetch(category.resource()).await {
            Ok(numbers) => {
                debug!("[UPSTREAM] {} returned {} numbers", category.resource(), numbers.len());
                FetchOutcome::Fresh(numbers)
            }
            Err(reason) => {
                warn!(
                    category = %category,
                    code = category.code(),
                    resource = category.resource(),
                    "[UPSTREAM] {} unavailable ({reason}), serving fallback",
                    category.resource(),
                );
                FetchOutcome::Fallback {
                    numbers: category.fallback().to_vec(),
                    reason,
                }
            }
        }
    }

    async fn request(&self, url: &str) -> std::result::Result<Vec<i64>, UpstreamUnavailable> {
        let resp = self.client.get(url).send().await.map_err(|e| self.classify(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamUnavailable::Status(status.as_u16()));
        }

        let body = resp.bytes().await.map_err(|e| self.classify(e))?;
        let parsed: UpstreamBody = serde_json::from_slice(&body)
            .map_err(|e| UpstreamUnavailable::MalformedBody(e.to_string()))?;
        Ok(parsed.numbers.unwrap_or_default())
    }

    fn classify(&self, e: reqwest::Error) -> UpstreamUnavailable {
        if e.is_timeout() {
            UpstreamUnavailable::Timeout(self.timeout)
        } else {
            UpstreamUnavailable::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{closed_port_url, spawn_server};
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    fn client(base: &str, timeout_ms: u64) -> UpstreamClient {
        UpstreamClient::new(base, Duration::from_millis(timeout_ms)).unwrap()
    }

    #[tokio::test]
    async fn fresh_numbers_are_returned() {
        let app = Router::new().route("/primes", get(|| async { Json(json!({ "numbers": [2, 3, 5] })) }));
        let base = spawn_server(app).await;

        let outcome = client(&base, 500).fetch_or_fallback(Category::Prime).await;
        assert_eq!(outcome, FetchOutcome::Fresh(vec![2, 3, 5]));
    }

    #[tokio::test]
    async fn missing_numbers_field_is_empty_not_fallback() {
        let app = Router::new()
            .route("/even", get(|| async { Json(json!({ "other": 1 })) }))
            .route("/rand", get(|| async { Json(json!({ "numbers": null })) }));
        let base = spawn_server(app).await;
        let c = client(&base, 500);

        assert_eq!(c.fetch_or_fallback(Category::Even).await, FetchOutcome::Fresh(vec![]));
        assert_eq!(c.fetch_or_fallback(Category::Random).await, FetchOutcome::Fresh(vec![]));
    }

    #[tokio::test]
    async fn slow_upstream_times_out_to_fallback() {
        let app = Router::new().route(
            "/primes",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({ "numbers": [97] }))
            }),
        );
        let base = spawn_server(app).await;

        let started = std::time::Instant::now();
        let outcome = client(&base, 100).fetch_or_fallback(Category::Prime).await;
        assert!(started.elapsed() < Duration::from_secs(2), "deadline not enforced");

        match outcome {
            FetchOutcome::Fallback { numbers, reason } => {
                assert_eq!(numbers, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
                assert_eq!(reason, UpstreamUnavailable::Timeout(Duration::from_millis(100)));
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_status_falls_back() {
        let app = Router::new().route("/fibo", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }));
        let base = spawn_server(app).await;

        let outcome = client(&base, 500).fetch_or_fallback(Category::Fibonacci).await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.numbers(), Category::Fibonacci.fallback());
        assert!(matches!(outcome, FetchOutcome::Fallback { reason: UpstreamUnavailable::Status(503), .. }));
    }

    #[tokio::test]
    async fn malformed_body_falls_back() {
        let app = Router::new()
            .route("/even", get(|| async { "definitely not json" }))
            .route("/rand", get(|| async { Json(json!({ "numbers": ["a", "b"] })) }));
        let base = spawn_server(app).await;
        let c = client(&base, 500);

        for category in [Category::Even, Category::Random] {
            let outcome = c.fetch_or_fallback(category).await;
            assert!(
                matches!(outcome, FetchOutcome::Fallback { reason: UpstreamUnavailable::MalformedBody(_), .. }),
                "{category}: {outcome:?}"
            );
        }
    }

    #[tokio::test]
    async fn unreachable_upstream_falls_back() {
        let base = closed_port_url().await;
        let outcome = client(&base, 500).fetch_or_fallback(Category::Random).await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_numbers(), Category::Random.fallback().to_vec());
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base() {
        let c = client("http://localhost:1/evaluation-service/", 500);
        assert_eq!(c.base_url(), "http://localhost:1/evaluation-service");
        assert_eq!(c.timeout(), Duration::from_millis(500));
    }
}
