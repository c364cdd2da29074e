//! GitHub API error types and the central failure classifier.

use reqwest::StatusCode;
use thiserror::Error;

/// How a non-2xx upstream response should be handled by callers.
///
/// Classification is centralized here so every component reacts identically
/// to the same status code instead of improvising per call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Stop the current pagination loop. Covers rate limiting and access
    /// blocks (403, 429, and 451 for legally blocked repositories).
    Forbidden,
    /// Definitive absence; propagate as "does not exist".
    NotFound,
    /// Log and skip the current page/call, then continue.
    Transient,
}

/// Map an upstream HTTP status to its failure kind.
pub fn classify_status(status: StatusCode) -> FailureKind {
    match status.as_u16() {
        403 | 429 | 451 => FailureKind::Forbidden,
        404 => FailureKind::NotFound,
        _ => FailureKind::Transient,
    }
}

/// Errors that can occur when talking to the GitHub API.
#[derive(Debug, Error)]
pub enum GithubError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream confirms the username does not exist.
    #[error("no such user upstream: {0}")]
    UserNotFound(String),

    /// A 2xx response carried a body we could not parse.
    #[error("unexpected payload from {url}: {message}")]
    Payload { url: String, message: String },

    /// Classified non-2xx response.
    #[error("upstream returned {status} for {url}")]
    Status {
        status: u16,
        kind: FailureKind,
        url: String,
    },
}

impl GithubError {
    /// The failure kind callers should dispatch on.
    ///
    /// Transport and payload problems count as transient: the page is
    /// skipped and the loop continues, same as any other soft failure.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            GithubError::Status { kind, .. } => *kind,
            GithubError::UserNotFound(_) => FailureKind::NotFound,
            GithubError::Transport(_) | GithubError::Payload { .. } => FailureKind::Transient,
        }
    }

    /// True when the enclosing pagination loop must stop.
    pub fn is_forbidden(&self) -> bool {
        self.failure_kind() == FailureKind::Forbidden
    }
}
