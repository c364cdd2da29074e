//! Repository reconciliation: merge the fetched repository set against the
//! stored one.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sea_orm::{DatabaseConnection, Set};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::entity::{repository, tracked_user};
use crate::github::{GithubClient, RepoSummary};
use crate::store;

use super::contributor::{self, ContributorResolution};
use super::error::SyncError;

/// What one reconciliation pass did and learned.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Contributions attributed to the user across all input repositories.
    pub total_contribution: i32,
    /// Stargazers across all input repositories, skipped forks included.
    pub total_stargazers: i32,
    /// Cycle accumulator: language name -> cumulative byte count.
    pub languages: HashMap<String, i64>,
}

impl ReconcileOutcome {
    fn merge_languages(&mut self, bytes: HashMap<String, i64>) {
        for (name, count) in bytes {
            *self.languages.entry(name).or_insert(0) += count;
        }
    }
}

/// Result of one fan-out fetch task.
enum FetchTask {
    Matched {
        slot: usize,
        resolution: ContributorResolution,
    },
    Fresh {
        slot: usize,
        resolution: ContributorResolution,
    },
}

/// Reconcile the user's fetched repositories (own plus organization ones)
/// against the stored set.
///
/// Matching against stored rows is by (full_name, owner) - the store has no
/// stable foreign key to upstream repository ids - and happens up front on
/// the coordinating task. Per-repository contributor and language fetches
/// then fan out concurrently, bounded by a semaphore, and their results are
/// folded back sequentially: field updates only where values changed, new
/// rows batch-inserted once, stored rows absent upstream batch-deleted
/// once, both only after every fetch task has completed.
pub async fn reconcile_repositories(
    db: &DatabaseConnection,
    client: &GithubClient,
    user: &tracked_user::Model,
    inputs: Vec<RepoSummary>,
    concurrency: usize,
) -> Result<ReconcileOutcome, SyncError> {
    let mut outcome = ReconcileOutcome::default();

    // Own and organization listings can overlap; keep the first sighting.
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let inputs: Vec<RepoSummary> = inputs
        .into_iter()
        .filter(|repo| seen.insert((repo.stored_full_name(), repo.owner.login.clone())))
        .collect();

    let mut stored = store::repos::find_by_user(db, user.id).await?;

    // Partition inputs: present in the store (still-present, recheck) or
    // fresh (full creation logic). Whatever remains in `stored` afterwards
    // was deleted upstream.
    let mut matched: Vec<(RepoSummary, repository::Model)> = Vec::new();
    let mut fresh: Vec<RepoSummary> = Vec::new();

    for input in inputs {
        let full_name = input.stored_full_name();
        match stored
            .iter()
            .position(|row| row.full_name == full_name && row.owner == input.owner.login)
        {
            Some(idx) => matched.push((input, stored.swap_remove(idx))),
            None => fresh.push(input),
        }
    }

    // Fan out contributor/language lookups; results come back over the
    // join handles and all store mutations happen on this task.
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::with_capacity(matched.len() + fresh.len());

    for (slot, (input, _)) in matched.iter().enumerate() {
        handles.push(spawn_resolution(
            client,
            &semaphore,
            input.clone(),
            user.username.clone(),
            user.public_repos,
            slot,
            true,
        ));
    }

    for (slot, input) in fresh.iter().enumerate() {
        if input.fork {
            // Forks are skipped outright; no fetch needed.
            continue;
        }
        handles.push(spawn_resolution(
            client,
            &semaphore,
            input.clone(),
            user.username.clone(),
            user.public_repos,
            slot,
            false,
        ));
    }

    let mut matched_resolutions: Vec<Option<ContributorResolution>> = vec![None; matched.len()];
    let mut fresh_resolutions: Vec<Option<ContributorResolution>> = vec![None; fresh.len()];

    for handle in handles {
        match handle.await {
            Ok(FetchTask::Matched { slot, resolution }) => {
                matched_resolutions[slot] = Some(resolution);
            }
            Ok(FetchTask::Fresh { slot, resolution }) => {
                fresh_resolutions[slot] = Some(resolution);
            }
            Err(e) => {
                tracing::warn!(error = %e, "repository fetch task panicked, skipping");
            }
        }
    }

    // Still-present rows: targeted updates only where a value changed.
    for ((input, row), resolution) in matched.into_iter().zip(matched_resolutions) {
        let resolution = resolution.unwrap_or_default();
        let contribution = resolution.contributions;

        let mut update = repository::ActiveModel {
            id: Set(row.id),
            ..Default::default()
        };
        let mut changed = false;

        if row.contribution != contribution {
            update.contribution = Set(contribution);
            changed = true;
        }
        if row.stargazers != input.stargazers_count {
            update.stargazers = Set(input.stargazers_count);
            changed = true;
        }
        if changed {
            store::repos::update(db, update).await?;
            outcome.updated += 1;
        }

        outcome.total_stargazers += input.stargazers_count;
        outcome.total_contribution += contribution;
        outcome.merge_languages(resolution.language_bytes);
    }

    // Fresh rows: forks never become records, but their stargazers still
    // count toward the user's total.
    let mut new_rows: Vec<repository::ActiveModel> = Vec::new();

    for (input, resolution) in fresh.into_iter().zip(fresh_resolutions) {
        outcome.total_stargazers += input.stargazers_count;

        if input.fork {
            continue;
        }

        let resolution = resolution.unwrap_or_default();
        outcome.total_contribution += resolution.contributions;

        let is_owner = input
            .owner
            .login
            .eq_ignore_ascii_case(&user.username);

        if resolution.is_contributor || is_owner {
            new_rows.push(repository::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                name: Set(input.name.clone()),
                full_name: Set(input.stored_full_name()),
                owner: Set(input.owner.login.clone()),
                contribution: Set(resolution.contributions),
                stargazers: Set(input.stargazers_count),
                primary_language: Set(input.language.clone().unwrap_or_default()),
                languages: Set(serde_json::json!(resolution.language_names)),
            });
        }

        outcome.merge_languages(resolution.language_bytes);
    }

    outcome.created = store::repos::insert_many(db, new_rows).await? as usize;

    let delete_ids: Vec<Uuid> = stored.into_iter().map(|row| row.id).collect();
    outcome.deleted = store::repos::delete_many(db, delete_ids).await? as usize;

    Ok(outcome)
}

fn spawn_resolution(
    client: &GithubClient,
    semaphore: &Arc<Semaphore>,
    input: RepoSummary,
    username: String,
    public_repos: i32,
    slot: usize,
    is_matched: bool,
) -> tokio::task::JoinHandle<FetchTask> {
    let client = client.clone();
    let semaphore = Arc::clone(semaphore);

    tokio::spawn(async move {
        let _permit = semaphore.acquire().await;
        let resolution = contributor::resolve(&client, &input, &username, public_repos).await;
        if is_matched {
            FetchTask::Matched { slot, resolution }
        } else {
            FetchTask::Fresh { slot, resolution }
        }
    })
}
