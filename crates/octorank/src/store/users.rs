//! Store operations for tracked users and the blocklist.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::blocked_user;
use crate::entity::tracked_user::{ActiveModel, Column, Entity as TrackedUser, Model};
use crate::entity::update_status::UpdateStatus;
use crate::score::SignalMaxima;

use super::errors::{Result, StoreError};

/// Find a tracked user by username.
pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> Result<Option<Model>> {
    TrackedUser::find()
        .filter(Column::Username.eq(username))
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Insert a new tracked user.
pub async fn insert(db: &DatabaseConnection, model: ActiveModel) -> Result<Model> {
    model.insert(db).await.map_err(StoreError::from)
}

/// Apply a targeted field update; only the `Set` fields are written.
pub async fn update(db: &DatabaseConnection, model: ActiveModel) -> Result<Model> {
    model.update(db).await.map_err(StoreError::from)
}

/// Set only the lifecycle status of a user.
pub async fn set_status(db: &DatabaseConnection, id: Uuid, status: UpdateStatus) -> Result<()> {
    let model = ActiveModel {
        id: Set(id),
        status: Set(status),
        ..Default::default()
    };
    model.update(db).await?;
    Ok(())
}

/// Users whose last update is older than `older_than`, oldest first.
pub async fn find_stale(
    db: &DatabaseConnection,
    older_than: DateTime<Utc>,
    limit: u64,
) -> Result<Vec<Model>> {
    TrackedUser::find()
        .filter(Column::UpdatedAt.lt(older_than))
        .order_by_asc(Column::UpdatedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Load every tracked user. Used by the ranking pass, which needs the whole
/// table in one sweep.
pub async fn all(db: &DatabaseConnection) -> Result<Vec<Model>> {
    TrackedUser::find().all(db).await.map_err(StoreError::from)
}

/// Count tracked users.
pub async fn count(db: &DatabaseConnection) -> Result<u64> {
    TrackedUser::find().count(db).await.map_err(StoreError::from)
}

/// Number of users with a total score strictly greater than `score`.
///
/// Rank is defined as this count plus one: a dense, count-based ordering
/// where ties receive consecutive ranks.
pub async fn count_with_score_above(db: &DatabaseConnection, score: i32) -> Result<u64> {
    TrackedUser::find()
        .filter(Column::TotalScore.gt(score))
        .count(db)
        .await
        .map_err(StoreError::from)
}

/// The highest (worst) rank currently stored, if any user has been ranked.
pub async fn max_rank(db: &DatabaseConnection) -> Result<Option<i32>> {
    let max: Option<Option<i32>> = TrackedUser::find()
        .select_only()
        .column_as(Column::CurrentRank.max(), "max_rank")
        .into_tuple()
        .one(db)
        .await?;
    Ok(max.flatten())
}

/// Global maxima for every scoring signal, in one aggregate query.
///
/// Empty table yields all-zero maxima; the score normalizer treats a zero
/// maximum as a zero-contribution signal.
pub async fn signal_maxima(db: &DatabaseConnection) -> Result<SignalMaxima> {
    let row: Option<(Option<i32>, Option<i32>, Option<i32>, Option<i32>)> = TrackedUser::find()
        .select_only()
        .column_as(Column::ContinuousCommitDays.max(), "max_commit_days")
        .column_as(Column::TotalContribution.max(), "max_contribution")
        .column_as(Column::Followers.max(), "max_followers")
        .column_as(Column::Following.max(), "max_following")
        .into_tuple()
        .one(db)
        .await?;

    let (commit_days, contribution, followers, following) = row.unwrap_or_default();
    Ok(SignalMaxima {
        continuous_commit_days: commit_days.unwrap_or(0),
        total_contribution: contribution.unwrap_or(0),
        followers: followers.unwrap_or(0),
        following: following.unwrap_or(0),
    })
}

/// Top `limit` users by one aggregate signal, best first.
///
/// Returns `(user_id, value)` pairs for the rank snapshot builder.
pub async fn top_by_signal(
    db: &DatabaseConnection,
    signal: &str,
    limit: u64,
) -> Result<Vec<(Uuid, i64)>> {
    let column = match signal {
        "total_score" => Column::TotalScore,
        "continuous_commit_days" => Column::ContinuousCommitDays,
        "total_contribution" => Column::TotalContribution,
        "total_stargazers" => Column::TotalStargazers,
        "followers" => Column::Followers,
        "following" => Column::Following,
        other => {
            return Err(StoreError::InvalidInput {
                message: format!("unknown ranking signal: {}", other),
            });
        }
    };

    let rows: Vec<(Uuid, i32)> = TrackedUser::find()
        .select_only()
        .column(Column::Id)
        .column(column)
        .order_by_desc(column)
        .limit(limit)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, value)| (id, i64::from(value)))
        .collect())
}

/// Check whether a username is on the permanent blocklist.
pub async fn is_blocked(db: &DatabaseConnection, username: &str) -> Result<bool> {
    let found = blocked_user::Entity::find()
        .filter(blocked_user::Column::Username.eq(username))
        .count(db)
        .await?;
    Ok(found > 0)
}

/// Add a username to the permanent blocklist. Idempotent.
pub async fn block(db: &DatabaseConnection, username: &str) -> Result<()> {
    if is_blocked(db, username).await? {
        return Ok(());
    }
    let model = blocked_user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
    };
    model.insert(db).await?;
    Ok(())
}

#[cfg(all(test, feature = "sqlite", feature = "migrate"))]
mod tests {
    use chrono::{Duration, Utc};

    use crate::connect_and_migrate;
    use crate::entity::tier::Tier;

    use super::*;

    async fn setup_db() -> DatabaseConnection {
        connect_and_migrate("sqlite::memory:")
            .await
            .expect("test db should migrate")
    }

    fn user(username: &str, score: i32, followers: i32) -> ActiveModel {
        let now = Utc::now().fixed_offset();
        ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            status: Set(UpdateStatus::None),
            name: Set(None),
            email: Set(None),
            location: Set(None),
            avatar_url: Set(None),
            company: Set(None),
            bio: Set(None),
            blog: Set(None),
            public_repos: Set(0),
            followers: Set(followers),
            following: Set(0),
            total_contribution: Set(0),
            total_stargazers: Set(0),
            continuous_commit_days: Set(0),
            total_score: Set(score),
            current_rank: Set(None),
            previous_rank: Set(None),
            tier: Set(Tier::Iron),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }

    #[tokio::test]
    async fn test_count_with_score_above_is_strict() {
        let db = setup_db().await;
        for (name, score) in [("a", 100), ("b", 200), ("c", 200), ("d", 300)] {
            insert(&db, user(name, score, 0)).await.expect("insert");
        }

        // Strictly greater: the two 200s do not count against each other.
        assert_eq!(count_with_score_above(&db, 200).await.unwrap(), 1);
        assert_eq!(count_with_score_above(&db, 100).await.unwrap(), 3);
        assert_eq!(count_with_score_above(&db, 300).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_signal_maxima_empty_table_is_zero() {
        let db = setup_db().await;
        let maxima = signal_maxima(&db).await.expect("maxima");
        assert_eq!(maxima.followers, 0);
        assert_eq!(maxima.total_contribution, 0);
    }

    #[tokio::test]
    async fn test_signal_maxima_takes_max_per_signal() {
        let db = setup_db().await;
        insert(&db, user("a", 0, 10)).await.expect("insert");
        insert(&db, user("b", 0, 50)).await.expect("insert");

        let maxima = signal_maxima(&db).await.expect("maxima");
        assert_eq!(maxima.followers, 50);
    }

    #[tokio::test]
    async fn test_top_by_signal_orders_descending() {
        let db = setup_db().await;
        let low = insert(&db, user("low", 10, 0)).await.expect("insert");
        let high = insert(&db, user("high", 90, 0)).await.expect("insert");

        let top = top_by_signal(&db, "total_score", 10).await.expect("top");
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], (high.id, 90));
        assert_eq!(top[1], (low.id, 10));
    }

    #[tokio::test]
    async fn test_top_by_signal_rejects_unknown_signal() {
        let db = setup_db().await;
        let err = top_by_signal(&db, "bogus", 10)
            .await
            .expect_err("unknown signal should fail");
        assert!(matches!(err, StoreError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_block_is_idempotent() {
        let db = setup_db().await;
        assert!(!is_blocked(&db, "spammer").await.unwrap());

        block(&db, "spammer").await.expect("first block");
        block(&db, "spammer").await.expect("second block");

        assert!(is_blocked(&db, "spammer").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_stale_orders_oldest_first() {
        let db = setup_db().await;
        let now = Utc::now();

        let mut oldest = user("oldest", 0, 0);
        oldest.updated_at = Set((now - Duration::days(20)).fixed_offset());
        let mut middle = user("middle", 0, 0);
        middle.updated_at = Set((now - Duration::days(10)).fixed_offset());
        let mut fresh = user("fresh", 0, 0);
        fresh.updated_at = Set(now.fixed_offset());

        for model in [oldest, middle, fresh] {
            insert(&db, model).await.expect("insert");
        }

        let stale = find_stale(&db, now - Duration::days(7), 10)
            .await
            .expect("find_stale");
        assert_eq!(stale.len(), 2);
        assert_eq!(stale[0].username, "oldest");
        assert_eq!(stale[1].username, "middle");
    }
}
