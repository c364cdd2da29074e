//! GitHub REST API client: request plumbing, boundary DTOs and the central
//! failure classifier.

pub mod client;
pub mod error;
pub mod types;

pub use client::{page_span, GithubClient, DEFAULT_BASE_URL, PER_PAGE};
pub use error::{classify_status, FailureKind, GithubError};
pub use types::{AccountKind, ContributorEntry, OrgSummary, RepoSummary, UserProfile};
