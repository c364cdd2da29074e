//! Store operations for languages and per-user byte counts.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::language::{self, Entity as Language};
use crate::entity::user_language::{self, Entity as UserLanguage};

use super::errors::{Result, StoreError};

/// All known languages.
pub async fn all(db: &DatabaseConnection) -> Result<Vec<language::Model>> {
    Language::find().all(db).await.map_err(StoreError::from)
}

/// Languages matching the given names.
pub async fn find_by_names(
    db: &DatabaseConnection,
    names: &[String],
) -> Result<Vec<language::Model>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    Language::find()
        .filter(language::Column::Name.is_in(names.iter().cloned()))
        .all(db)
        .await
        .map_err(StoreError::from)
}

/// Batch-create languages. Returns the number inserted.
pub async fn insert_many(db: &DatabaseConnection, names: Vec<String>) -> Result<u64> {
    if names.is_empty() {
        return Ok(0);
    }

    let count = names.len() as u64;
    let models: Vec<language::ActiveModel> = names
        .into_iter()
        .map(|name| language::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
        })
        .collect();

    Language::insert_many(models).exec(db).await?;
    Ok(count)
}

/// A user's stored language rows for the given language ids, with the
/// language loaded alongside each association.
pub async fn user_languages(
    db: &DatabaseConnection,
    user_id: Uuid,
    language_ids: &[Uuid],
) -> Result<Vec<(user_language::Model, language::Model)>> {
    if language_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = UserLanguage::find()
        .filter(user_language::Column::UserId.eq(user_id))
        .filter(user_language::Column::LanguageId.is_in(language_ids.iter().copied()))
        .find_also_related(Language)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(ul, lang)| lang.map(|l| (ul, l)))
        .collect())
}

/// Update the byte count of one association.
pub async fn set_bytes(db: &DatabaseConnection, id: Uuid, bytes: i64) -> Result<()> {
    let model = user_language::ActiveModel {
        id: Set(id),
        bytes: Set(bytes),
        ..Default::default()
    };
    model.update(db).await?;
    Ok(())
}

/// Batch-create (user, language, bytes) associations.
pub async fn link_many(
    db: &DatabaseConnection,
    user_id: Uuid,
    pairs: Vec<(Uuid, i64)>,
) -> Result<u64> {
    if pairs.is_empty() {
        return Ok(0);
    }

    let count = pairs.len() as u64;
    let models: Vec<user_language::ActiveModel> = pairs
        .into_iter()
        .map(|(language_id, bytes)| user_language::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            language_id: Set(language_id),
            bytes: Set(bytes),
        })
        .collect();

    UserLanguage::insert_many(models).exec(db).await?;
    Ok(count)
}

/// Top users for one language by byte count, best first.
pub async fn top_users_for_language(
    db: &DatabaseConnection,
    language_id: Uuid,
    limit: u64,
) -> Result<Vec<(Uuid, i64)>> {
    let rows: Vec<(Uuid, i64)> = UserLanguage::find()
        .filter(user_language::Column::LanguageId.eq(language_id))
        .select_only()
        .column(user_language::Column::UserId)
        .column(user_language::Column::Bytes)
        .order_by_desc(user_language::Column::Bytes)
        .limit(limit)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows)
}
