//! Store operations for repositories.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use uuid::Uuid;

use crate::entity::repository::{ActiveModel, Column, Entity as Repository, Model};

use super::errors::{Result, StoreError};

/// All repositories currently stored for a user.
pub async fn find_by_user(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<Model>> {
    Repository::find()
        .filter(Column::UserId.eq(user_id))
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Batch-insert new repositories. Returns the number inserted.
pub async fn insert_many(db: &DatabaseConnection, models: Vec<ActiveModel>) -> Result<u64> {
    if models.is_empty() {
        return Ok(0);
    }

    let count = models.len() as u64;
    Repository::insert_many(models).exec(db).await?;
    Ok(count)
}

/// Apply a targeted field update; only the `Set` fields are written.
pub async fn update(db: &DatabaseConnection, model: ActiveModel) -> Result<Model> {
    model.update(db).await.map_err(StoreError::from)
}

/// Batch-delete repositories by id. Returns the number of rows deleted.
pub async fn delete_many(db: &DatabaseConnection, ids: Vec<Uuid>) -> Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    let result = Repository::delete_many()
        .filter(Column::Id.is_in(ids))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    use super::*;

    fn active_model(user_id: Uuid, owner: &str, name: &str) -> ActiveModel {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(name.to_string()),
            full_name: Set(format!("{}/{}", owner, name)),
            owner: Set(owner.to_string()),
            contribution: Set(0),
            stargazers: Set(0),
            primary_language: Set(String::new()),
            languages: Set(serde_json::json!([])),
        }
    }

    #[tokio::test]
    async fn insert_many_returns_zero_for_empty_input() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let count = insert_many(&db, Vec::new()).await.expect("should succeed");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn insert_many_returns_model_count_for_non_empty_input() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([MockExecResult {
                rows_affected: 2,
                last_insert_id: 0,
            }])
            .into_connection();

        let user_id = Uuid::new_v4();
        let models = vec![
            active_model(user_id, "org", "a"),
            active_model(user_id, "org", "b"),
        ];
        let count = insert_many(&db, models)
            .await
            .expect("insert_many should succeed");
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn delete_many_returns_zero_for_empty_input() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let deleted = delete_many(&db, Vec::new()).await.expect("should succeed");
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn delete_many_returns_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([MockExecResult {
                rows_affected: 3,
                last_insert_id: 0,
            }])
            .into_connection();

        let deleted = delete_many(&db, vec![Uuid::new_v4(), Uuid::new_v4()])
            .await
            .expect("delete_many should succeed");
        assert_eq!(deleted, 3);
    }
}
