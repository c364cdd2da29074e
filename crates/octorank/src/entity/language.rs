//! Language entity - global, keyed by unique lower-cased name.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "languages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Lower-cased language name; upstream casing is normalized at the
    /// client boundary so lookups stay case-insensitive.
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_language::Entity")]
    UserLanguage,
}

impl Related<super::user_language::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserLanguage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
