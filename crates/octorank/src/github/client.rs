//! GitHub API client.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::gate::ApiRateLimiter;

use super::error::{classify_status, GithubError};
use super::types::{ContributorEntry, OrgSummary, RateLimitStatus, RepoSummary, UserProfile};

/// Default API root; tests point the client at a local mock server instead.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Fixed page size for every list-returning endpoint.
pub const PER_PAGE: u32 = 50;

/// Authenticated GitHub REST client.
///
/// Cheap to clone: the HTTP connection pool and token are shared. All list
/// endpoints take a full URL (the profile payload hands those out) plus a
/// 1-indexed page; callers drive pagination until exhausted or a page
/// budget is hit.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    token: Arc<String>,
    base_url: String,
    /// Optional proactive pacer; the hard budget lives in the rate gate.
    pacer: Option<ApiRateLimiter>,
}

impl GithubClient {
    /// Create an authenticated client against the public API.
    pub fn new(token: &str) -> Result<Self, GithubError> {
        let http = reqwest::Client::builder()
            .user_agent("octorank")
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            token: Arc::new(token.to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            pacer: None,
        })
    }

    /// Override the API root (mock servers in tests, GHES deployments).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Attach a proactive requests-per-second pacer.
    pub fn with_pacer(mut self, pacer: ApiRateLimiter) -> Self {
        self.pacer = Some(pacer);
        self
    }

    /// The configured API root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET and parse the JSON body.
    ///
    /// Non-2xx statuses become [`GithubError::Status`] carrying the central
    /// classification; callers dispatch on `failure_kind()` instead of
    /// re-interpreting raw status codes.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, GithubError> {
        if let Some(ref pacer) = self.pacer {
            pacer.wait().await;
        }

        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if !self.token.is_empty() {
            request = request.bearer_auth(self.token.as_str());
        }
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(GithubError::Status {
                status: status.as_u16(),
                kind: classify_status(status),
                url: url.to_string(),
            });
        }

        response.json::<T>().await.map_err(|e| GithubError::Payload {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    fn page_query(page: u32) -> [(&'static str, String); 2] {
        [
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ]
    }

    /// Fetch a user's profile.
    ///
    /// A 404 is definitive (`UserNotFound`); any other failure is a soft
    /// failure the caller treats like budget pressure.
    pub async fn get_user(&self, username: &str) -> Result<UserProfile, GithubError> {
        let url = format!("{}/users/{}", self.base_url, username);
        match self.get_json::<UserProfile>(&url, &[]).await {
            Err(GithubError::Status { status: 404, .. }) => {
                Err(GithubError::UserNotFound(username.to_string()))
            }
            other => other,
        }
    }

    /// Fetch one page of a repository listing.
    pub async fn get_repositories(
        &self,
        url: &str,
        page: u32,
    ) -> Result<Vec<RepoSummary>, GithubError> {
        self.get_json(url, &Self::page_query(page)).await
    }

    /// Fetch a user's organizations.
    pub async fn get_organizations(&self, url: &str) -> Result<Vec<OrgSummary>, GithubError> {
        self.get_json(url, &[]).await
    }

    /// Fetch one page of a repository's contributor listing.
    pub async fn get_contributors(
        &self,
        url: &str,
        page: u32,
    ) -> Result<Vec<ContributorEntry>, GithubError> {
        self.get_json(url, &Self::page_query(page)).await
    }

    /// Fetch a repository's language byte map.
    ///
    /// Keys are lower-cased here so the global language table stays
    /// case-insensitive regardless of upstream casing.
    pub async fn get_languages(&self, url: &str) -> Result<HashMap<String, i64>, GithubError> {
        let raw: HashMap<String, i64> = self.get_json(url, &[]).await?;
        let mut lowered = HashMap::with_capacity(raw.len());
        for (name, bytes) in raw {
            *lowered.entry(name.to_lowercase()).or_insert(0) += bytes;
        }
        Ok(lowered)
    }

    /// Remaining calls in the current rate window.
    ///
    /// Fail-safe: any transport or parse failure reads as 0 ("assume
    /// exhausted") rather than propagating the raw error - an unreadable
    /// budget must never be mistaken for an available one.
    pub async fn rate_remaining(&self) -> u32 {
        let url = format!("{}/rate_limit", self.base_url);
        match self.get_json::<RateLimitStatus>(&url, &[]).await {
            Ok(status) => status.rate.remaining,
            Err(e) => {
                tracing::warn!(error = %e, "rate status unavailable, assuming exhausted");
                0
            }
        }
    }
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Pages needed to cover `total` items at the fixed page size, minimum one.
pub fn page_span(total: i32) -> u32 {
    (total.max(0) as u32) / PER_PAGE + 1
}
