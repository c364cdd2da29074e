//! Pipeline error taxonomy and propagation policy.
//!
//! Page-level failures are absorbed where they happen (skip and continue),
//! except `Forbidden` classifications, which abort only their enclosing
//! pagination loop. The variants here are user-level: each aborts that
//! user's update cycle. Batch callers continue to the next user on any of
//! them except [`SyncError::RateExhausted`], which aborts the whole batch
//! since the budget is process-wide.

use thiserror::Error;

use crate::github::GithubError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Upstream confirms the username does not exist.
    #[error("no such user: {0}")]
    UserNotFound(String),

    /// The upstream entity is an organization, never tracked as a user.
    #[error("{0} is not a user account")]
    NotAUserAccount(String),

    /// The username is permanently blocklisted.
    #[error("{0} is blocked")]
    Blocked(String),

    /// The shared upstream call budget is exhausted for this window.
    #[error("upstream rate budget exhausted")]
    RateExhausted,

    /// Record-store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unabsorbed upstream failure.
    #[error(transparent)]
    Upstream(GithubError),
}

impl From<GithubError> for SyncError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::UserNotFound(username) => SyncError::UserNotFound(username),
            other => SyncError::Upstream(other),
        }
    }
}

impl SyncError {
    /// True when a batch sweep must stop instead of moving to the next
    /// user.
    pub fn aborts_batch(&self) -> bool {
        matches!(self, SyncError::RateExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_not_found_is_lifted_from_upstream() {
        let err: SyncError = GithubError::UserNotFound("ghost".to_string()).into();
        assert!(matches!(err, SyncError::UserNotFound(ref u) if u == "ghost"));
    }

    #[test]
    fn test_only_rate_exhaustion_aborts_batches() {
        assert!(SyncError::RateExhausted.aborts_batch());
        assert!(!SyncError::UserNotFound("x".to_string()).aborts_batch());
        assert!(!SyncError::Blocked("x".to_string()).aborts_batch());
    }
}
