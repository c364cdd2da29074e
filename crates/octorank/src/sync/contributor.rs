//! Contributor resolution for a single repository.

use std::collections::HashMap;

use crate::github::{page_span, GithubClient, RepoSummary, PER_PAGE};

/// Hard upper bound on contributor pages per repository.
///
/// The primary page bound is derived from the owner's public repo count (a
/// source heuristic: contributor-list length roughly tracks repo count),
/// which can over-shoot badly for atypical repos. This cap forces
/// termination regardless.
pub const MAX_CONTRIBUTOR_PAGES: u32 = 40;

/// What the resolver learned about one repository.
///
/// Returned to the caller rather than written into shared state: fan-out
/// workers hand their results back to a single coordinating task, which
/// applies every mutation sequentially.
#[derive(Clone, Debug, Default)]
pub struct ContributorResolution {
    pub is_contributor: bool,
    pub contributions: i32,
    /// Lower-cased names of every language used in the repository.
    pub language_names: Vec<String>,
    /// Language name -> byte count, merged into the cycle accumulator.
    pub language_bytes: HashMap<String, i64>,
}

/// Pages to scan for this repository's contributor list.
pub fn contributor_page_bound(public_repos: i32) -> u32 {
    page_span(public_repos).min(MAX_CONTRIBUTOR_PAGES)
}

/// Determine whether `username` is a contributor to `repo`, and if so how
/// much they contributed and in which languages.
///
/// Pagination stops at the page bound, on a short page, or immediately on
/// a `Forbidden` classification (too-many-contributors is a known upstream
/// limit, not a transient) - in that case the user is reported as not a
/// contributor. Any other per-page failure is logged and that page is
/// skipped.
pub async fn resolve(
    client: &GithubClient,
    repo: &RepoSummary,
    username: &str,
    public_repos: i32,
) -> ContributorResolution {
    let bound = contributor_page_bound(public_repos);

    for page in 1..=bound {
        let entries = match client.get_contributors(&repo.contributors_url, page).await {
            Ok(entries) => entries,
            Err(e) if e.is_forbidden() => {
                tracing::debug!(
                    repo = %repo.full_name,
                    error = %e,
                    "contributor listing forbidden, assuming not a contributor"
                );
                return ContributorResolution::default();
            }
            Err(e) => {
                tracing::warn!(
                    repo = %repo.full_name,
                    page,
                    error = %e,
                    "skipping contributor page"
                );
                continue;
            }
        };

        for entry in &entries {
            if entry.matches_user(username) {
                let mut resolution = ContributorResolution {
                    is_contributor: true,
                    contributions: entry.contributions,
                    ..Default::default()
                };

                if entry.contributions > 0 {
                    match client.get_languages(&repo.languages_url).await {
                        Ok(bytes) => {
                            let mut names: Vec<String> = bytes.keys().cloned().collect();
                            names.sort();
                            resolution.language_names = names;
                            resolution.language_bytes = bytes;
                        }
                        Err(e) => {
                            tracing::warn!(
                                repo = %repo.full_name,
                                error = %e,
                                "language lookup failed, recording contributor without languages"
                            );
                        }
                    }
                }

                return resolution;
            }
        }

        if entries.len() < PER_PAGE as usize {
            break;
        }
    }

    ContributorResolution::default()
}
