//! Per-user language byte counts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// (user, language) association holding the number of bytes of code the
/// user has written in that language. Created when first seen, updated when
/// the count changes, never deleted by the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_languages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,
    pub language_id: Uuid,
    /// Bytes of code written in this language across the user's repositories.
    pub bytes: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tracked_user::Entity",
        from = "Column::UserId",
        to = "super::tracked_user::Column::Id"
    )]
    TrackedUser,
    #[sea_orm(
        belongs_to = "super::language::Entity",
        from = "Column::LanguageId",
        to = "super::language::Column::Id"
    )]
    Language,
}

impl Related<super::tracked_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackedUser.def()
    }
}

impl Related<super::language::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Language.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
