//! Boundary DTOs for recognized upstream response shapes.
//!
//! Dynamic payloads are mapped to explicit structured records here, parsed
//! and validated once at the client boundary. Unknown fields are ignored;
//! malformed payloads are rejected as errors rather than propagated inward.

use serde::Deserialize;

use crate::entity::repository::bounded_full_name;

/// Upstream account kind; organizations are never tracked as users.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum AccountKind {
    User,
    Organization,
    /// Anything else upstream may invent (e.g. "Bot", anonymous entries).
    #[default]
    #[serde(other)]
    Other,
}

/// Profile response for `GET /users/{username}`.
#[derive(Clone, Debug, Deserialize)]
pub struct UserProfile {
    pub login: String,
    #[serde(rename = "type", default)]
    pub kind: AccountKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub public_repos: i32,
    #[serde(default)]
    pub followers: i32,
    #[serde(default)]
    pub following: i32,
    pub repos_url: String,
    pub organizations_url: String,
}

/// Owner fragment nested inside a repository payload.
#[derive(Clone, Debug, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

/// One repository from a repository list response.
#[derive(Clone, Debug, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub full_name: String,
    pub owner: RepoOwner,
    #[serde(default)]
    pub stargazers_count: i32,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub language: Option<String>,
    pub contributors_url: String,
    pub languages_url: String,
}

impl RepoSummary {
    /// The full name as stored locally, bounded with a truncation marker.
    ///
    /// Matching against stored rows uses this form, so overly long upstream
    /// names stay comparable across fetches.
    pub fn stored_full_name(&self) -> String {
        bounded_full_name(&self.full_name)
    }
}

/// One organization from `GET /users/{username}/orgs`.
#[derive(Clone, Debug, Deserialize)]
pub struct OrgSummary {
    pub login: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub repos_url: String,
}

/// One entry from a contributors listing.
///
/// `login` is optional because anonymous contributors carry an email
/// instead; those entries never match a tracked user.
#[derive(Clone, Debug, Deserialize)]
pub struct ContributorEntry {
    #[serde(rename = "type", default)]
    pub kind: AccountKind,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub contributions: i32,
}

impl ContributorEntry {
    /// True when this entry is the given tracked user.
    ///
    /// Upstream logins are case-insensitive, and only entries of kind
    /// `User` count - organizations listed as contributors are ignored.
    pub fn matches_user(&self, username: &str) -> bool {
        self.kind == AccountKind::User
            && self
                .login
                .as_deref()
                .is_some_and(|login| login.eq_ignore_ascii_case(username))
    }
}

/// Response shape of `GET /rate_limit`.
#[derive(Clone, Debug, Deserialize)]
pub struct RateLimitStatus {
    pub rate: RateCore,
}

/// Core-API rate bucket.
#[derive(Clone, Debug, Deserialize)]
pub struct RateCore {
    pub remaining: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parses_with_null_optionals() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "login": "alice",
            "type": "User",
            "name": null,
            "public_repos": 3,
            "followers": 10,
            "following": 5,
            "repos_url": "https://api.github.com/users/alice/repos",
            "organizations_url": "https://api.github.com/users/alice/orgs"
        }))
        .expect("profile should parse");

        assert_eq!(profile.login, "alice");
        assert_eq!(profile.kind, AccountKind::User);
        assert!(profile.name.is_none());
        assert_eq!(profile.public_repos, 3);
    }

    #[test]
    fn test_unknown_account_kind_is_other() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "login": "robot",
            "type": "Bot",
            "repos_url": "https://api.github.com/users/robot/repos",
            "organizations_url": "https://api.github.com/users/robot/orgs"
        }))
        .expect("profile should parse");

        assert_eq!(profile.kind, AccountKind::Other);
    }

    #[test]
    fn test_contributor_match_is_case_insensitive() {
        let entry = ContributorEntry {
            kind: AccountKind::User,
            login: Some("Alice".to_string()),
            contributions: 42,
        };
        assert!(entry.matches_user("alice"));
        assert!(entry.matches_user("ALICE"));
        assert!(!entry.matches_user("bob"));
    }

    #[test]
    fn test_organization_contributor_never_matches() {
        let entry = ContributorEntry {
            kind: AccountKind::Organization,
            login: Some("alice".to_string()),
            contributions: 42,
        };
        assert!(!entry.matches_user("alice"));
    }

    #[test]
    fn test_anonymous_contributor_never_matches() {
        let entry: ContributorEntry = serde_json::from_value(serde_json::json!({
            "type": "Anonymous",
            "email": "anon@example.com",
            "contributions": 7
        }))
        .expect("anonymous entry should parse");
        assert!(!entry.matches_user("alice"));
    }

    #[test]
    fn test_stored_full_name_bounds_long_names() {
        let mut repo: RepoSummary = serde_json::from_value(serde_json::json!({
            "name": "r",
            "full_name": "alice/r",
            "owner": {"login": "alice"},
            "contributors_url": "u",
            "languages_url": "u"
        }))
        .expect("repo should parse");

        assert_eq!(repo.stored_full_name(), "alice/r");

        repo.full_name = "x".repeat(600);
        assert!(repo.stored_full_name().ends_with("..."));
    }
}
