//! Store operations for organizations and user memberships.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::organization::{ActiveModel, Column, Entity as Organization, Model};
use crate::entity::user_organization;

use super::errors::{Result, StoreError};

/// Find an organization by its unique name.
pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Model>> {
    Organization::find()
        .filter(Column::Name.eq(name))
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Insert a new organization.
pub async fn insert(db: &DatabaseConnection, model: ActiveModel) -> Result<Model> {
    model.insert(db).await.map_err(StoreError::from)
}

/// Apply a targeted field update; only the `Set` fields are written.
pub async fn update(db: &DatabaseConnection, model: ActiveModel) -> Result<Model> {
    model.update(db).await.map_err(StoreError::from)
}

/// Names of the organizations a user is currently linked to.
pub async fn membership_names(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<String>> {
    let names: Vec<String> = user_organization::Entity::find()
        .filter(user_organization::Column::UserId.eq(user_id))
        .inner_join(Organization)
        .select_only()
        .column(Column::Name)
        .into_tuple()
        .all(db)
        .await?;
    Ok(names)
}

/// Batch-create membership links between a user and organizations.
pub async fn link_memberships(
    db: &DatabaseConnection,
    user_id: Uuid,
    organization_ids: Vec<Uuid>,
) -> Result<u64> {
    if organization_ids.is_empty() {
        return Ok(0);
    }

    let count = organization_ids.len() as u64;
    let links: Vec<user_organization::ActiveModel> = organization_ids
        .into_iter()
        .map(|organization_id| user_organization::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            organization_id: Set(organization_id),
        })
        .collect();

    user_organization::Entity::insert_many(links).exec(db).await?;
    Ok(count)
}

/// Batch-delete a user's membership links by organization name.
pub async fn unlink_memberships_by_name(
    db: &DatabaseConnection,
    user_id: Uuid,
    names: &[String],
) -> Result<u64> {
    if names.is_empty() {
        return Ok(0);
    }

    let org_ids: Vec<Uuid> = Organization::find()
        .filter(Column::Name.is_in(names.iter().cloned()))
        .select_only()
        .column(Column::Id)
        .into_tuple()
        .all(db)
        .await?;

    if org_ids.is_empty() {
        return Ok(0);
    }

    let result = user_organization::Entity::delete_many()
        .filter(user_organization::Column::UserId.eq(user_id))
        .filter(user_organization::Column::OrganizationId.is_in(org_ids))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(all(test, feature = "sqlite", feature = "migrate"))]
mod tests {
    use chrono::Utc;

    use crate::connect_and_migrate;
    use crate::entity::tracked_user;
    use crate::entity::update_status::UpdateStatus;

    use super::*;

    async fn setup_db_with_user() -> (DatabaseConnection, Uuid) {
        let db = connect_and_migrate("sqlite::memory:")
            .await
            .expect("test db should migrate");

        let now = Utc::now().fixed_offset();
        let user = tracked_user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set("member".to_string()),
            status: Set(UpdateStatus::None),
            name: Set(None),
            email: Set(None),
            location: Set(None),
            avatar_url: Set(None),
            company: Set(None),
            bio: Set(None),
            blog: Set(None),
            public_repos: Set(0),
            followers: Set(0),
            following: Set(0),
            total_contribution: Set(0),
            total_stargazers: Set(0),
            continuous_commit_days: Set(0),
            total_score: Set(0),
            current_rank: Set(None),
            previous_rank: Set(None),
            tier: Set(crate::entity::tier::Tier::Iron),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let user = user.insert(&db).await.expect("user should insert");

        (db, user.id)
    }

    fn org(name: &str) -> ActiveModel {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(None),
            logo_url: Set(None),
        }
    }

    #[tokio::test]
    async fn test_membership_diff_round_trip() {
        let (db, user_id) = setup_db_with_user().await;

        let a = insert(&db, org("org-a")).await.expect("org-a");
        let b = insert(&db, org("org-b")).await.expect("org-b");

        link_memberships(&db, user_id, vec![a.id, b.id])
            .await
            .expect("link");

        let mut names = membership_names(&db, user_id).await.expect("names");
        names.sort();
        assert_eq!(names, vec!["org-a".to_string(), "org-b".to_string()]);

        let removed = unlink_memberships_by_name(&db, user_id, &["org-a".to_string()])
            .await
            .expect("unlink");
        assert_eq!(removed, 1);

        let names = membership_names(&db, user_id).await.expect("names");
        assert_eq!(names, vec!["org-b".to_string()]);
    }

    #[tokio::test]
    async fn test_unlink_unknown_name_is_noop() {
        let (db, user_id) = setup_db_with_user().await;
        let removed = unlink_memberships_by_name(&db, user_id, &["ghost".to_string()])
            .await
            .expect("unlink");
        assert_eq!(removed, 0);
    }
}
