//! The per-user update orchestrator.

use chrono::Utc;
use sea_orm::Set;
use uuid::Uuid;

use crate::entity::tier::Tier;
use crate::entity::tracked_user::{ActiveModel, Model};
use crate::entity::update_status::UpdateStatus;
use crate::github::{page_span, RepoSummary, UserProfile, AccountKind, PER_PAGE};
use crate::notify::Notification;
use crate::score::{self, ScoreSignals};
use crate::store;

use super::context::{UpdateContext, REPOSITORY_CAP};
use super::error::SyncError;
use super::{languages, orgs, repos};

/// Run one user's full update cycle.
///
/// Sequence: blocklist check, rate-budget check, profile fetch, user-record
/// reconciliation, repository merging (own plus organization), language
/// aggregation, streak probe, then score/rank/tier computation and the
/// final persist. The budget gates the cycle as a whole; failures of
/// individual sub-calls are absorbed further down the pipeline.
///
/// On budget exhaustion (and on soft profile-fetch failures) the username
/// is enqueued for deferred retry exactly once, provided the context opted
/// into deferral.
#[tracing::instrument(skip(ctx), fields(username = %username))]
pub async fn update_user(ctx: &UpdateContext<'_>, username: &str) -> Result<Model, SyncError> {
    if store::users::is_blocked(ctx.db, username).await? {
        return Err(SyncError::Blocked(username.to_string()));
    }

    if !ctx.gate.is_available().await {
        return Err(defer_and_exhaust(ctx, username).await?);
    }

    let profile = match ctx.client.get_user(username).await {
        Ok(profile) => profile,
        Err(e) => {
            return Err(match SyncError::from(e) {
                // Definitive: the username does not exist upstream.
                err @ SyncError::UserNotFound(_) => err,
                // Anything else is a soft failure; retry later.
                other => {
                    tracing::warn!(error = %other, "profile fetch failed, deferring");
                    defer_and_exhaust(ctx, username).await?
                }
            });
        }
    };

    if profile.kind != AccountKind::User {
        return Err(SyncError::NotAUserAccount(username.to_string()));
    }

    let user = reconcile_user_record(ctx, username, &profile).await?;

    match run_cycle(ctx, &user, &profile).await {
        Ok(updated) => Ok(updated),
        Err(e) => {
            // Best effort; the cycle error is what the caller needs to see.
            if let Err(mark_err) =
                store::users::set_status(ctx.db, user.id, UpdateStatus::Failed).await
            {
                tracing::warn!(error = %mark_err, "failed to mark user as failed");
            }
            Err(e)
        }
    }
}

/// Enqueue a deferred-work item (when opted in) and yield `RateExhausted`.
async fn defer_and_exhaust(
    ctx: &UpdateContext<'_>,
    username: &str,
) -> Result<SyncError, SyncError> {
    if ctx.options.defer_on_exhaustion {
        store::queue::enqueue(ctx.db, username).await?;
        tracing::info!("queued for deferred update");
    }
    Ok(SyncError::RateExhausted)
}

/// Create the tracked-user row or apply a targeted profile-field update.
async fn reconcile_user_record(
    ctx: &UpdateContext<'_>,
    username: &str,
    profile: &UserProfile,
) -> Result<Model, SyncError> {
    let now = Utc::now().fixed_offset();

    match store::users::find_by_username(ctx.db, username).await? {
        Some(existing) => {
            let mut update = ActiveModel {
                id: Set(existing.id),
                status: Set(UpdateStatus::Updating),
                updated_at: Set(now),
                ..Default::default()
            };

            if existing.name != profile.name {
                update.name = Set(profile.name.clone());
            }
            if existing.email != profile.email {
                update.email = Set(profile.email.clone());
            }
            if existing.location != profile.location {
                update.location = Set(profile.location.clone());
            }
            if existing.avatar_url != profile.avatar_url {
                update.avatar_url = Set(profile.avatar_url.clone());
            }
            if existing.company != profile.company {
                update.company = Set(profile.company.clone());
            }
            if existing.bio != profile.bio {
                update.bio = Set(profile.bio.clone());
            }
            if existing.blog != profile.blog {
                update.blog = Set(profile.blog.clone());
            }
            if existing.public_repos != profile.public_repos {
                update.public_repos = Set(profile.public_repos);
            }
            if existing.followers != profile.followers {
                update.followers = Set(profile.followers);
            }
            if existing.following != profile.following {
                update.following = Set(profile.following);
            }

            Ok(store::users::update(ctx.db, update).await?)
        }
        None => {
            let created = store::users::insert(
                ctx.db,
                ActiveModel {
                    id: Set(Uuid::new_v4()),
                    username: Set(username.to_string()),
                    status: Set(UpdateStatus::Updating),
                    name: Set(profile.name.clone()),
                    email: Set(profile.email.clone()),
                    location: Set(profile.location.clone()),
                    avatar_url: Set(profile.avatar_url.clone()),
                    company: Set(profile.company.clone()),
                    bio: Set(profile.bio.clone()),
                    blog: Set(profile.blog.clone()),
                    public_repos: Set(profile.public_repos),
                    followers: Set(profile.followers),
                    following: Set(profile.following),
                    total_contribution: Set(0),
                    total_stargazers: Set(0),
                    continuous_commit_days: Set(0),
                    total_score: Set(0),
                    current_rank: Set(None),
                    previous_rank: Set(None),
                    tier: Set(Tier::Iron),
                    created_at: Set(now),
                    updated_at: Set(now),
                },
            )
            .await?;

            ctx.notifier
                .send(Notification::UserJoined {
                    username: created.username.clone(),
                    bio: created.bio.clone(),
                    company: created.company.clone(),
                    avatar_url: created.avatar_url.clone(),
                })
                .await;

            Ok(created)
        }
    }
}

/// Everything after the user record exists: repository and language
/// merging, streak, score, rank, tier, final persist.
async fn run_cycle(
    ctx: &UpdateContext<'_>,
    user: &Model,
    profile: &UserProfile,
) -> Result<Model, SyncError> {
    let mut inputs = fetch_own_repositories(ctx, profile).await;

    let org_repos = orgs::reconcile_organizations(
        ctx.db,
        ctx.client,
        user,
        &profile.organizations_url,
        ctx.options.concurrency,
    )
    .await?;
    inputs.extend(org_repos);

    let outcome = repos::reconcile_repositories(
        ctx.db,
        ctx.client,
        user,
        inputs,
        ctx.options.concurrency,
    )
    .await?;

    tracing::debug!(
        created = outcome.created,
        updated = outcome.updated,
        deleted = outcome.deleted,
        contribution = outcome.total_contribution,
        stargazers = outcome.total_stargazers,
        "repositories reconciled"
    );

    languages::flush(ctx.db, user.id, outcome.languages).await?;

    // Streak probing scrapes; anything but a completed report keeps the
    // previously stored value.
    let continuous_commit_days = match ctx.streak.continuous_days(&user.username).await {
        Ok(report) if report.completed => report.days,
        Ok(_) => user.continuous_commit_days,
        Err(e) => {
            tracing::warn!(error = %e, "streak probe failed, keeping stored value");
            user.continuous_commit_days
        }
    };

    let maxima = store::users::signal_maxima(ctx.db).await?;
    let total_score = score::total_score(
        &ScoreSignals {
            continuous_commit_days,
            total_contribution: outcome.total_contribution,
            followers: profile.followers,
            following: profile.following,
        },
        &maxima,
    );

    let rank = store::users::count_with_score_above(ctx.db, total_score).await? as i32 + 1;
    let stored_max_rank = store::users::max_rank(ctx.db).await?.unwrap_or(0);
    let tier = Tier::from_rank(rank, i32::max(stored_max_rank, rank));

    let updated = store::users::update(
        ctx.db,
        ActiveModel {
            id: Set(user.id),
            status: Set(UpdateStatus::Completed),
            total_contribution: Set(outcome.total_contribution),
            total_stargazers: Set(outcome.total_stargazers),
            continuous_commit_days: Set(continuous_commit_days),
            total_score: Set(total_score),
            previous_rank: Set(user.current_rank),
            current_rank: Set(Some(rank)),
            tier: Set(tier),
            updated_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        },
    )
    .await?;

    Ok(updated)
}

/// Fetch the user's own repositories, page-bounded by their public repo
/// count and capped at [`REPOSITORY_CAP`] overall.
async fn fetch_own_repositories(
    ctx: &UpdateContext<'_>,
    profile: &UserProfile,
) -> Vec<RepoSummary> {
    let mut repositories: Vec<RepoSummary> = Vec::new();

    for page in 1..=page_span(profile.public_repos) {
        match ctx.client.get_repositories(&profile.repos_url, page).await {
            Ok(batch) => {
                let batch_len = batch.len();
                repositories.extend(batch);
                if batch_len < PER_PAGE as usize {
                    break;
                }
            }
            Err(e) if e.is_forbidden() => {
                tracing::warn!(error = %e, "repository listing forbidden, stopping pagination");
                break;
            }
            Err(e) => {
                tracing::warn!(page, error = %e, "skipping repository page");
            }
        }
    }

    if repositories.len() > REPOSITORY_CAP {
        tracing::warn!(
            count = repositories.len(),
            cap = REPOSITORY_CAP,
            "repository cap exceeded, truncating"
        );
        repositories.truncate(REPOSITORY_CAP);
    }

    repositories
}
