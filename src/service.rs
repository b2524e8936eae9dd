//! Per-request pipeline: resolve category → fetch → update window → average.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::api::health::HealthState;
use crate::api::latency::{FetchLatency, FetchPath};
use crate::average::average;
use crate::error::Result;
use crate::fetcher::{FetchOutcome, UpstreamClient};
use crate::registry;
use crate::state::WindowStore;
use crate::types::NumbersResponse;

/// Owns every collaborator a request touches. The window is injected so tests
/// (or a future per-category layout) can supply their own store.
pub struct NumberService {
    window: Arc<WindowStore>,
    upstream: UpstreamClient,
    latency: Arc<FetchLatency>,
    health: Arc<HealthState>,
}

impl NumberService {
    pub fn new(
        window: Arc<WindowStore>,
        upstream: UpstreamClient,
        latency: Arc<FetchLatency>,
        health: Arc<HealthState>,
    ) -> Arc<Self> {
        Arc::new(Self { window, upstream, latency, health })
    }

    pub fn window(&self) -> &Arc<WindowStore> {
        &self.window
    }

    pub fn latency(&self) -> &Arc<FetchLatency> {
        &self.latency
    }

    pub fn health(&self) -> &Arc<HealthState> {
        &self.health
    }

    /// Serve one `GET /numbers/{code}`.
    ///
    /// Unknown codes fail before any upstream call. Upstream failures never
    /// fail the request. The average covers the post-update window, not just
    /// the freshly fetched numbers.
    pub async fn handle(&self, code: &str) -> Result<NumbersResponse> {
        let category = registry::resolve(code)?;

        let started = Instant::now();
        let outcome = self.upstream.fetch_or_fallback(category).await;
        self.latency.record(FetchPath::of(&outcome), started.elapsed());
        self.record_outcome(&outcome);

        let numbers = outcome.into_numbers();
        let (previous, current) = self.window.insert_and_snapshot(&numbers)?;
        let avg = average(current.as_slice());

        self.health.inc_requests_served();
        debug!(
            code,
            fetched = numbers.len(),
            window_len = current.len(),
            avg,
            "served /numbers/{code}"
        );

        Ok(NumbersResponse {
            window_prev_state: previous,
            window_curr_state: current,
            numbers,
            avg,
        })
    }

    fn record_outcome(&self, outcome: &FetchOutcome) {
        if outcome.is_fallback() {
            self.health.record_fallback(crate::now_ns());
        } else {
            self.health.inc_upstream_fresh();
        }
    }
}
