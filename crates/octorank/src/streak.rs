//! The continuous-commit-streak collaborator.
//!
//! Streak probing is scraping-based upstream and therefore slow and
//! unreliable; only its output contract lives here. The orchestrator falls
//! back to the previously stored streak whenever a probe fails or reports
//! an incomplete crawl.

use async_trait::async_trait;
use thiserror::Error;

/// Outcome of one streak probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreakReport {
    /// Whether the probe crawled to completion. Incomplete reports carry a
    /// partial count and must not overwrite the stored value.
    pub completed: bool,
    /// Length of the user's current 1-commit-per-day streak.
    pub days: i32,
}

#[derive(Debug, Error)]
pub enum StreakError {
    #[error("streak probe failed: {0}")]
    Probe(String),
}

/// External function computing (completed, streak_days) for a username.
#[async_trait]
pub trait StreakProvider: Send + Sync {
    async fn continuous_days(&self, username: &str) -> Result<StreakReport, StreakError>;
}

/// No-op provider: always reports an incomplete probe, so the stored
/// streak value is kept as-is.
pub struct NullStreak;

#[async_trait]
impl StreakProvider for NullStreak {
    async fn continuous_days(&self, _username: &str) -> Result<StreakReport, StreakError> {
        Ok(StreakReport {
            completed: false,
            days: 0,
        })
    }
}

/// Fixed provider for tests and backfills.
pub struct FixedStreak(pub i32);

#[async_trait]
impl StreakProvider for FixedStreak {
    async fn continuous_days(&self, _username: &str) -> Result<StreakReport, StreakError> {
        Ok(StreakReport {
            completed: true,
            days: self.0,
        })
    }
}
