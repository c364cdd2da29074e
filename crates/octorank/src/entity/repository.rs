//! Repository entity - one row per repository the tracked user owns or
//! contributes to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Longest `full_name` stored verbatim; longer names are cut and marked.
pub const FULL_NAME_MAX: usize = 490;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "repositories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,

    pub name: String,
    /// `owner/name`, truncated with a `...` marker past [`FULL_NAME_MAX`].
    pub full_name: String,
    /// Owner login (user or organization).
    pub owner: String,

    /// Contributions attributed to the tracked user on this repository.
    pub contribution: i32,
    pub stargazers: i32,

    /// Primary language as reported upstream; empty when unknown.
    pub primary_language: String,
    /// All languages used in the repository, as a JSON array of names.
    #[sea_orm(column_type = "Json")]
    pub languages: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tracked_user::Entity",
        from = "Column::UserId",
        to = "super::tracked_user::Column::Id"
    )]
    TrackedUser,
}

impl Related<super::tracked_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackedUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Bound a repository full name, marking truncation with an ellipsis.
pub fn bounded_full_name(full_name: &str) -> String {
    if full_name.len() < FULL_NAME_MAX {
        full_name.to_string()
    } else {
        let cut: String = full_name.chars().take(FULL_NAME_MAX).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_full_name_untouched() {
        assert_eq!(bounded_full_name("octocat/hello-world"), "octocat/hello-world");
    }

    #[test]
    fn test_long_full_name_truncated_with_marker() {
        let long = "o".repeat(600);
        let bounded = bounded_full_name(&long);
        assert_eq!(bounded.len(), FULL_NAME_MAX + 3);
        assert!(bounded.ends_with("..."));
    }
}
