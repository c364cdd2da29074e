//! Store operations for rank snapshot entries.

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::rank_entry::{ActiveModel, Column, Entity as RankEntry, Model};

use super::errors::Result;

/// Replace the whole snapshot for one signal atomically.
///
/// The delete and re-insert run inside a single transaction so a failure
/// mid-rebuild never leaves a mixed snapshot for that signal. Entries are
/// `(position, user_id, score)` tuples, positions 1-indexed.
pub async fn replace_signal(
    db: &DatabaseConnection,
    signal: &str,
    entries: Vec<(i32, Uuid, i64)>,
) -> Result<()> {
    let signal = signal.to_string();
    db.transaction::<_, (), sea_orm::DbErr>(|txn| {
        Box::pin(async move {
            RankEntry::delete_many()
                .filter(Column::Signal.eq(signal.clone()))
                .exec(txn)
                .await?;

            if entries.is_empty() {
                return Ok(());
            }

            let models: Vec<ActiveModel> = entries
                .into_iter()
                .map(|(position, user_id, score)| ActiveModel {
                    id: Set(Uuid::new_v4()),
                    signal: Set(signal.clone()),
                    position: Set(position),
                    user_id: Set(Some(user_id)),
                    score: Set(score),
                })
                .collect();

            RankEntry::insert_many(models).exec(txn).await?;
            Ok(())
        })
    })
    .await?;
    Ok(())
}

/// The snapshot rows for one signal, ordered by position.
pub async fn for_signal(db: &DatabaseConnection, signal: &str) -> Result<Vec<Model>> {
    RankEntry::find()
        .filter(Column::Signal.eq(signal))
        .order_by_asc(Column::Position)
        .all(db)
        .await
        .map_err(super::StoreError::from)
}

#[cfg(all(test, feature = "sqlite", feature = "migrate"))]
mod tests {
    use crate::connect_and_migrate;

    use super::*;

    #[tokio::test]
    async fn test_replace_signal_rebuilds_snapshot() {
        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("test db should migrate");

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        replace_signal(&db, "followers", vec![(1, first, 500), (2, second, 300)])
            .await
            .expect("first snapshot");

        // A later pass fully replaces the previous snapshot.
        replace_signal(&db, "followers", vec![(1, second, 800)])
            .await
            .expect("second snapshot");

        let rows = for_signal(&db, "followers").await.expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[0].user_id, Some(second));
        assert_eq!(rows[0].score, 800);
    }

    #[tokio::test]
    async fn test_replace_signal_does_not_touch_other_signals() {
        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("test db should migrate");

        let user = Uuid::new_v4();
        replace_signal(&db, "followers", vec![(1, user, 1)])
            .await
            .expect("followers snapshot");
        replace_signal(&db, "total_score", vec![(1, user, 2)])
            .await
            .expect("total_score snapshot");

        replace_signal(&db, "followers", vec![])
            .await
            .expect("clear followers");

        assert!(for_signal(&db, "followers").await.unwrap().is_empty());
        assert_eq!(for_signal(&db, "total_score").await.unwrap().len(), 1);
    }
}
