//! The process-wide rate budget gate and the proactive request pacer.
//!
//! Two layers cooperate here. The [`RateGate`] is the budget authority: it
//! reports how many upstream calls remain in the current window and gates
//! every top-level update cycle (not every individual call - sub-call
//! failures are absorbed locally by the sync pipeline). The
//! [`ApiRateLimiter`] is a smoothing layer that paces individual requests
//! so bursts don't chew through the window.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use crate::github::GithubClient;

type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default pacing for the GitHub core API: 5000 requests/hour is ~1.4/sec;
/// 10/sec leaves room for bursts while the gate holds the hard budget.
pub const GITHUB_DEFAULT_RPS: u32 = 10;

/// The remaining-call budget for the current upstream window.
///
/// Injectable so tests substitute a deterministic budget instead of a
/// class-level cached value.
#[async_trait]
pub trait RateGate: Send + Sync {
    /// Remaining calls in the current window; 0 means exhausted.
    ///
    /// Implementations must be fail-safe: an unreadable budget reads as 0.
    async fn remaining(&self) -> u32;

    /// True when at least one call remains.
    async fn is_available(&self) -> bool {
        self.remaining().await > 0
    }
}

/// Live gate backed by the upstream rate-status endpoint.
pub struct LiveRateGate {
    client: GithubClient,
}

impl LiveRateGate {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RateGate for LiveRateGate {
    async fn remaining(&self) -> u32 {
        self.client.rate_remaining().await
    }
}

/// Deterministic gate with a fixed, decrementing budget.
///
/// Each `remaining()` probe consumes one unit once the initial value is
/// nonzero, which lets tests walk a batch into exhaustion mid-way.
pub struct FixedRateGate {
    budget: AtomicU32,
}

impl FixedRateGate {
    pub fn new(budget: u32) -> Self {
        Self {
            budget: AtomicU32::new(budget),
        }
    }

    /// A gate that always reports an exhausted budget.
    pub fn exhausted() -> Self {
        Self::new(0)
    }
}

#[async_trait]
impl RateGate for FixedRateGate {
    async fn remaining(&self) -> u32 {
        let current = self.budget.load(Ordering::SeqCst);
        if current > 0 {
            self.budget.fetch_sub(1, Ordering::SeqCst);
        }
        current
    }
}

/// A standalone request pacer built on the governor crate.
///
/// Call [`ApiRateLimiter::wait`] before an API request to smooth request
/// rate; this never consults the upstream budget.
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// Create a pacer allowing `requests_per_second` requests (minimum 1).
    pub fn new(requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second)
            .unwrap_or_else(|| NonZeroU32::new(1).expect("1 is nonzero"));
        Self {
            inner: Arc::new(RateLimiter::direct(Quota::per_second(rps))),
        }
    }

    /// Wait until the pacer allows another request.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_gate_counts_down() {
        let gate = FixedRateGate::new(2);
        assert_eq!(gate.remaining().await, 2);
        assert_eq!(gate.remaining().await, 1);
        assert_eq!(gate.remaining().await, 0);
        assert_eq!(gate.remaining().await, 0);
    }

    #[tokio::test]
    async fn test_exhausted_gate_is_never_available() {
        let gate = FixedRateGate::exhausted();
        assert!(!gate.is_available().await);
    }

    #[tokio::test]
    async fn test_pacer_zero_rps_falls_back_to_one() {
        // Must not panic; a zero quota is clamped to 1/sec.
        let pacer = ApiRateLimiter::new(0);
        pacer.wait().await;
    }
}
