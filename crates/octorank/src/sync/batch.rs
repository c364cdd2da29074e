//! Batch jobs: periodic refresh, deferred-queue drain, ranking rebuild.
//!
//! Users are processed independently; a per-user failure is logged and the
//! sweep continues - except rate exhaustion, which aborts the whole batch
//! because the call budget is process-wide, not per-user.

use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::entity::queue_status::QueueStatus;
use crate::notify::{Notification, Notifier};
use crate::store;

use super::context::UpdateContext;
use super::error::SyncError;
use super::{engine, ranking};

/// Users untouched for this many days are swept by [`refresh_stale`].
pub const STALE_AFTER_DAYS: i64 = 7;

/// Upper bound on users refreshed per sweep.
pub const REFRESH_BATCH_LIMIT: u64 = 1000;

/// What a batch sweep accomplished.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Users the sweep attempted.
    pub processed: usize,
    /// Users updated successfully.
    pub updated: usize,
    /// True when the sweep stopped early on rate exhaustion.
    pub aborted: bool,
}

/// Refresh users whose last update is at least a week old, oldest first.
///
/// The rate budget is checked once up front; a sweep that cannot even
/// start returns quietly as aborted.
pub async fn refresh_stale(ctx: &UpdateContext<'_>) -> Result<BatchOutcome, SyncError> {
    let mut outcome = BatchOutcome::default();

    if !ctx.gate.is_available().await {
        tracing::info!("rate budget exhausted, skipping refresh sweep");
        outcome.aborted = true;
        return Ok(outcome);
    }

    let cutoff = Utc::now() - Duration::days(STALE_AFTER_DAYS);
    let stale = store::users::find_stale(ctx.db, cutoff, REFRESH_BATCH_LIMIT).await?;
    if stale.is_empty() {
        return Ok(outcome);
    }

    ctx.notifier
        .send(Notification::BatchStarted {
            job: "stale-user refresh".to_string(),
        })
        .await;
    let started = std::time::Instant::now();

    for user in stale {
        outcome.processed += 1;
        match engine::update_user(ctx, &user.username).await {
            Ok(_) => outcome.updated += 1,
            Err(e) if e.aborts_batch() => {
                tracing::warn!(username = %user.username, "rate budget exhausted mid-sweep");
                ctx.notifier
                    .send(Notification::RateLimitAborted {
                        job: "stale-user refresh".to_string(),
                        updated: outcome.updated,
                    })
                    .await;
                outcome.aborted = true;
                break;
            }
            Err(e) => {
                tracing::warn!(username = %user.username, error = %e, "user refresh failed, continuing");
            }
        }
    }

    ctx.notifier
        .send(Notification::BatchFinished {
            job: "stale-user refresh".to_string(),
            updated: outcome.updated,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
        .await;

    Ok(outcome)
}

/// Drain the deferred-work queue: every ready or failed item gets one
/// attempt, marked success or fail.
///
/// Draining never re-enqueues the item being drained, so deferral is
/// disabled for the inner updates.
pub async fn drain_deferred(ctx: &UpdateContext<'_>) -> Result<BatchOutcome, SyncError> {
    let mut outcome = BatchOutcome::default();

    let items = store::queue::pending(ctx.db).await?;
    if items.is_empty() {
        return Ok(outcome);
    }

    if !ctx.gate.is_available().await {
        tracing::info!("rate budget exhausted, skipping queue drain");
        outcome.aborted = true;
        return Ok(outcome);
    }

    ctx.notifier
        .send(Notification::BatchStarted {
            job: "deferred-queue drain".to_string(),
        })
        .await;
    let started = std::time::Instant::now();
    let drain_ctx = ctx.without_deferral();

    for item in items {
        outcome.processed += 1;
        match engine::update_user(&drain_ctx, &item.username).await {
            Ok(_) => {
                store::queue::mark(ctx.db, item.id, QueueStatus::Success).await?;
                outcome.updated += 1;
            }
            Err(e) if e.aborts_batch() => {
                // Leave the item pending; it will be retried next drain.
                ctx.notifier
                    .send(Notification::RateLimitAborted {
                        job: "deferred-queue drain".to_string(),
                        updated: outcome.updated,
                    })
                    .await;
                outcome.aborted = true;
                break;
            }
            Err(e) => {
                tracing::warn!(username = %item.username, error = %e, "deferred update failed");
                store::queue::mark(ctx.db, item.id, QueueStatus::Fail).await?;
            }
        }
    }

    ctx.notifier
        .send(Notification::BatchFinished {
            job: "deferred-queue drain".to_string(),
            updated: outcome.updated,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
        .await;

    Ok(outcome)
}

/// Full ranking rebuild: signal snapshots, language snapshots, then the
/// global rank/tier pass.
pub async fn rebuild_rankings(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
) -> Result<usize, SyncError> {
    notifier
        .send(Notification::BatchStarted {
            job: "ranking rebuild".to_string(),
        })
        .await;
    let started = std::time::Instant::now();

    ranking::rebuild_signal_snapshots(db).await?;
    ranking::rebuild_language_snapshots(db).await?;
    let updated = ranking::recompute_ranks(db).await?;

    notifier
        .send(Notification::BatchFinished {
            job: "ranking rebuild".to_string(),
            updated,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
        .await;

    Ok(updated)
}
