//! Shared health counters for the /health endpoint.
//! Updated by NumberService on every served request.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free request/upstream counters. Written by the handler, read by the API.
#[derive(Default)]
pub struct HealthState {
    /// Requests that produced a numbers response.
    pub requests_served: AtomicU64,
    /// Upstream fetches that answered in time with a usable body.
    pub upstream_fresh: AtomicU64,
    /// Upstream fetches replaced by fallback data.
    pub upstream_fallbacks: AtomicU64,
    /// Nanosecond timestamp of the last fallback (0 = none).
    pub last_fallback_at_ns: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_requests_served(&self) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_upstream_fresh(&self) {
        self.upstream_fresh.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self, at_ns: u64) {
        self.upstream_fallbacks.fetch_add(1, Ordering::Relaxed);
        self.last_fallback_at_ns.store(at_ns, Ordering::Relaxed);
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }

    pub fn upstream_fresh(&self) -> u64 {
        self.upstream_fresh.load(Ordering::Relaxed)
    }

    pub fn upstream_fallbacks(&self) -> u64 {
        self.upstream_fallbacks.load(Ordering::Relaxed)
    }

    pub fn last_fallback_at_ns(&self) -> u64 {
        self.last_fallback_at_ns.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let h = HealthState::new();
        h.inc_requests_served();
        h.inc_requests_served();
        h.inc_upstream_fresh();
        h.record_fallback(42);
        assert_eq!(h.requests_served(), 2);
        assert_eq!(h.upstream_fresh(), 1);
        assert_eq!(h.upstream_fallbacks(), 1);
        assert_eq!(h.last_fallback_at_ns(), 42);
    }
}
