//! Upstream fetch latency, split by whether the provider answered or we fell back.
//! A timed-out fetch lands in the fallback histogram near the configured deadline,
//! so keeping the two apart stops timeouts from hiding real provider latency.

use std::sync::Mutex;
use std::time::Duration;

use hdrhistogram::Histogram;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::fetcher::FetchOutcome;

/// Longest fetch we expect to record, in microseconds (60s). Larger samples are clamped.
const MAX_TRACKED_US: u64 = 60_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPath {
    Fresh,
    Fallback,
}

impl FetchPath {
    pub fn of(outcome: &FetchOutcome) -> Self {
        if outcome.is_fallback() {
            FetchPath::Fallback
        } else {
            FetchPath::Fresh
        }
    }
}

/// Percentiles for one path, in milliseconds. `None` until a sample exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathLatency {
    pub samples: u64,
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
}

struct Histograms {
    fresh: Histogram<u64>,
    fallback: Histogram<u64>,
}

impl Histograms {
    fn path(&self, path: FetchPath) -> &Histogram<u64> {
        match path {
            FetchPath::Fresh => &self.fresh,
            FetchPath::Fallback => &self.fallback,
        }
    }

    fn path_mut(&mut self, path: FetchPath) -> &mut Histogram<u64> {
        match path {
            FetchPath::Fresh => &mut self.fresh,
            FetchPath::Fallback => &mut self.fallback,
        }
    }
}

/// Written by `NumberService` after each fetch, read by `/stats/latency`.
pub struct FetchLatency {
    inner: Mutex<Histograms>,
}

impl FetchLatency {
    pub fn new() -> Result<Self> {
        let histogram = || {
            Histogram::<u64>::new_with_bounds(1, MAX_TRACKED_US, 3)
                .map_err(|e| AppError::Internal(format!("latency histogram: {e}")))
        };
        Ok(Self {
            inner: Mutex::new(Histograms {
                fresh: histogram()?,
                fallback: histogram()?,
            }),
        })
    }

    pub fn record(&self, path: FetchPath, elapsed: Duration) {
        let us = u64::try_from(elapsed.as_micros())
            .unwrap_or(u64::MAX)
            .clamp(1, MAX_TRACKED_US);
        if let Ok(mut h) = self.inner.lock() {
            let _ = h.path_mut(path).record(us);
        }
    }

    pub fn summary(&self, path: FetchPath) -> PathLatency {
        let Ok(h) = self.inner.lock() else {
            return PathLatency { samples: 0, p50_ms: None, p95_ms: None, p99_ms: None };
        };
        let hist = h.path(path);
        let at = |q: f64| (hist.len() > 0).then(|| hist.value_at_quantile(q) as f64 / 1_000.0);
        PathLatency {
            samples: hist.len(),
            p50_ms: at(0.5),
            p95_ms: at(0.95),
            p99_ms: at(0.99),
        }
    }

    /// Samples across both paths.
    pub fn samples(&self) -> u64 {
        self.inner
            .lock()
            .map(|h| h.fresh.len() + h.fallback.len())
            .unwrap_or(0)
    }
}
