//! Store operations for the deferred-work queue.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::deferred_user::{ActiveModel, Column, Entity as DeferredUser, Model};
use crate::entity::queue_status::QueueStatus;

use super::errors::{Result, StoreError};

/// Enqueue a username for a later retry.
///
/// Idempotent for pending work: if a ready or failed item already exists
/// for the username, it is left in place instead of inserting a duplicate.
pub async fn enqueue(db: &DatabaseConnection, username: &str) -> Result<Model> {
    let existing = DeferredUser::find()
        .filter(Column::Username.eq(username))
        .filter(Column::Status.is_in([QueueStatus::Ready, QueueStatus::Fail]))
        .one(db)
        .await?;

    if let Some(item) = existing {
        return Ok(item);
    }

    let now = Utc::now().fixed_offset();
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        status: Set(QueueStatus::Ready),
        created_at: Set(now),
        updated_at: Set(now),
    };
    model.insert(db).await.map_err(StoreError::from)
}

/// Items waiting to be drained (status ready or fail), oldest first.
pub async fn pending(db: &DatabaseConnection) -> Result<Vec<Model>> {
    DeferredUser::find()
        .filter(Column::Status.is_in([QueueStatus::Ready, QueueStatus::Fail]))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Mark one item's drain outcome.
pub async fn mark(db: &DatabaseConnection, id: Uuid, status: QueueStatus) -> Result<()> {
    let model = ActiveModel {
        id: Set(id),
        status: Set(status),
        updated_at: Set(Utc::now().fixed_offset()),
        ..Default::default()
    };
    model.update(db).await?;
    Ok(())
}

#[cfg(all(test, feature = "sqlite", feature = "migrate"))]
mod tests {
    use crate::connect_and_migrate;

    use super::*;

    #[tokio::test]
    async fn test_enqueue_is_idempotent_for_pending_items() {
        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("test db should migrate");

        let first = enqueue(&db, "alice").await.expect("first enqueue");
        let second = enqueue(&db, "alice").await.expect("second enqueue");
        assert_eq!(first.id, second.id);

        let items = pending(&db).await.expect("pending");
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_enqueue_after_success_creates_fresh_item() {
        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("test db should migrate");

        let first = enqueue(&db, "alice").await.expect("enqueue");
        mark(&db, first.id, QueueStatus::Success)
            .await
            .expect("mark success");

        let second = enqueue(&db, "alice").await.expect("re-enqueue");
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_pending_includes_failed_items() {
        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("test db should migrate");

        let item = enqueue(&db, "bob").await.expect("enqueue");
        mark(&db, item.id, QueueStatus::Fail).await.expect("mark");

        let items = pending(&db).await.expect("pending");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, QueueStatus::Fail);
    }
}
