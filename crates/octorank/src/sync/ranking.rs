//! Ranking rebuild: leaderboard snapshots and the global rank/tier pass.

use sea_orm::{DatabaseConnection, Set};
use uuid::Uuid;

use crate::entity::tier::Tier;
use crate::entity::tracked_user::ActiveModel;
use crate::score;
use crate::store;

use super::error::SyncError;

/// Aggregate signals with a leaderboard snapshot.
pub const RANKED_SIGNALS: [&str; 6] = [
    "total_score",
    "continuous_commit_days",
    "total_contribution",
    "total_stargazers",
    "followers",
    "following",
];

/// Leaderboard depth for aggregate signals.
pub const SIGNAL_DEPTH: u64 = 100;

/// Leaderboard depth for per-language boards.
pub const LANGUAGE_DEPTH: u64 = 10;

/// Rebuild the top-N snapshot for every aggregate signal.
///
/// Each signal's snapshot is replaced inside its own all-or-nothing
/// transaction, so a mid-rebuild failure never leaves a mixed snapshot for
/// one signal type.
pub async fn rebuild_signal_snapshots(db: &DatabaseConnection) -> Result<(), SyncError> {
    for signal in RANKED_SIGNALS {
        let top = store::users::top_by_signal(db, signal, SIGNAL_DEPTH).await?;
        let entries: Vec<(i32, Uuid, i64)> = top
            .into_iter()
            .enumerate()
            .map(|(idx, (user_id, value))| (idx as i32 + 1, user_id, value))
            .collect();
        store::ranks::replace_signal(db, signal, entries).await?;
        tracing::debug!(signal, "signal snapshot rebuilt");
    }
    Ok(())
}

/// Rebuild the per-language top-N snapshots (`lang-<name>` signals).
pub async fn rebuild_language_snapshots(db: &DatabaseConnection) -> Result<(), SyncError> {
    for language in store::languages::all(db).await? {
        let top =
            store::languages::top_users_for_language(db, language.id, LANGUAGE_DEPTH).await?;
        let entries: Vec<(i32, Uuid, i64)> = top
            .into_iter()
            .enumerate()
            .map(|(idx, (user_id, bytes))| (idx as i32 + 1, user_id, bytes))
            .collect();
        store::ranks::replace_signal(db, &format!("lang-{}", language.name), entries).await?;
    }
    Ok(())
}

/// Recompute every user's rank and tier from current total scores.
///
/// Ranks are a dense count-based ordering: 1 plus the number of strictly
/// greater scores, computed over the whole table in one sweep (this is the
/// serialization point of the ranking pass). Each user's old rank rotates
/// into `previous_rank`. Returns the number of users updated.
pub async fn recompute_ranks(db: &DatabaseConnection) -> Result<usize, SyncError> {
    let users = store::users::all(db).await?;
    if users.is_empty() {
        return Ok(0);
    }

    let scores: Vec<i32> = users.iter().map(|user| user.total_score).collect();
    let ranks: Vec<i32> = users
        .iter()
        .map(|user| score::rank_among(user.total_score, &scores))
        .collect();
    let max_rank = ranks.iter().copied().max().unwrap_or(1);

    let mut updated = 0usize;
    for (user, rank) in users.into_iter().zip(ranks) {
        store::users::update(
            db,
            ActiveModel {
                id: Set(user.id),
                previous_rank: Set(user.current_rank),
                current_rank: Set(Some(rank)),
                tier: Set(Tier::from_rank(rank, max_rank)),
                ..Default::default()
            },
        )
        .await?;
        updated += 1;
    }

    Ok(updated)
}
