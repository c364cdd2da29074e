//! Organization reconciliation: membership diffing and candidate-repository
//! expansion.

use std::collections::HashSet;
use std::sync::Arc;

use sea_orm::{DatabaseConnection, Set};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::entity::{organization, tracked_user};
use crate::github::{GithubClient, OrgSummary, RepoSummary, PER_PAGE};
use crate::store;

use super::error::SyncError;

/// Page budget for one organization's repository listing.
pub const MAX_ORG_REPO_PAGES: u32 = 10;

/// Reconcile the user's organizations and expand them into candidate
/// repositories.
///
/// Each fetched organization is upserted by its unique name (description
/// and logo updated only on change) and membership links are diffed by
/// name: new links batch-created, stale ones batch-deleted. Every org's
/// repository list is then fetched, and each repository is checked for
/// contributorship concurrently; only confirmed repositories are returned
/// for the repository reconciler.
pub async fn reconcile_organizations(
    db: &DatabaseConnection,
    client: &GithubClient,
    user: &tracked_user::Model,
    organizations_url: &str,
    concurrency: usize,
) -> Result<Vec<RepoSummary>, SyncError> {
    let orgs = match client.get_organizations(organizations_url).await {
        Ok(orgs) => orgs,
        Err(e) => {
            // Organization data is enrichment; a failed listing degrades
            // the cycle instead of aborting it.
            tracing::warn!(username = %user.username, error = %e, "organization listing failed");
            return Ok(Vec::new());
        }
    };

    sync_memberships(db, user, &orgs).await?;

    let candidates = collect_org_repositories(client, &orgs).await;
    Ok(filter_contributed(client, &user.username, candidates, concurrency).await)
}

/// Upsert organizations and diff the user's membership links.
async fn sync_memberships(
    db: &DatabaseConnection,
    user: &tracked_user::Model,
    orgs: &[OrgSummary],
) -> Result<(), SyncError> {
    let current: HashSet<String> = store::orgs::membership_names(db, user.id)
        .await?
        .into_iter()
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut link_ids: Vec<Uuid> = Vec::new();

    for org in orgs {
        seen.insert(org.login.clone());

        let org_id = match store::orgs::find_by_name(db, &org.login).await? {
            Some(existing) => {
                let mut update = organization::ActiveModel {
                    id: Set(existing.id),
                    ..Default::default()
                };
                let mut changed = false;

                if existing.description != org.description {
                    update.description = Set(org.description.clone());
                    changed = true;
                }
                if existing.logo_url != org.avatar_url {
                    update.logo_url = Set(org.avatar_url.clone());
                    changed = true;
                }
                if changed {
                    store::orgs::update(db, update).await?;
                }
                existing.id
            }
            None => {
                let created = store::orgs::insert(
                    db,
                    organization::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        name: Set(org.login.clone()),
                        description: Set(org.description.clone()),
                        logo_url: Set(org.avatar_url.clone()),
                    },
                )
                .await?;
                created.id
            }
        };

        if !current.contains(&org.login) {
            link_ids.push(org_id);
        }
    }

    store::orgs::link_memberships(db, user.id, link_ids).await?;

    let stale: Vec<String> = current.difference(&seen).cloned().collect();
    store::orgs::unlink_memberships_by_name(db, user.id, &stale).await?;

    Ok(())
}

/// Fetch every organization's repository list, bounded per org.
async fn collect_org_repositories(
    client: &GithubClient,
    orgs: &[OrgSummary],
) -> Vec<RepoSummary> {
    let mut candidates = Vec::new();

    for org in orgs {
        for page in 1..=MAX_ORG_REPO_PAGES {
            match client.get_repositories(&org.repos_url, page).await {
                Ok(repos) => {
                    let page_len = repos.len();
                    candidates.extend(repos);
                    if page_len < PER_PAGE as usize {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(org = %org.login, page, error = %e, "org repository listing failed");
                    break;
                }
            }
        }
    }

    candidates
}

/// Keep only repositories where the user shows up as a contributor.
///
/// A lightweight first-page check: anything kept here still goes through
/// the full contributor resolver inside the repository reconciler, so this
/// only prunes candidates, it never decides stored values.
async fn filter_contributed(
    client: &GithubClient,
    username: &str,
    candidates: Vec<RepoSummary>,
    concurrency: usize,
) -> Vec<RepoSummary> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::with_capacity(candidates.len());

    for repo in candidates {
        let client = client.clone();
        let semaphore = Arc::clone(&semaphore);
        let username = username.to_string();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire().await;
            match client.get_contributors(&repo.contributors_url, 1).await {
                Ok(entries) => entries
                    .iter()
                    .any(|entry| entry.matches_user(&username))
                    .then_some(repo),
                Err(e) => {
                    // 451 (access blocked) and friends land here; the repo
                    // simply doesn't qualify this cycle.
                    tracing::debug!(repo = %repo.full_name, error = %e, "org repo contributor check failed");
                    None
                }
            }
        }));
    }

    let mut confirmed = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(Some(repo)) => confirmed.push(repo),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "org contributor check task panicked"),
        }
    }
    confirmed
}
