//! TrackedUser entity - the per-user aggregate record driving the ranking.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::tier::Tier;
use crate::entity::update_status::UpdateStatus;

/// A GitHub user tracked by the aggregation pipeline.
///
/// `username` is immutable once the row exists; everything else is refreshed
/// by update cycles. `total_score` and `current_rank` are only ever written
/// together, rotating the old `current_rank` into `previous_rank`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tracked_users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// GitHub login, compared case-insensitively against upstream.
    #[sea_orm(unique)]
    pub username: String,
    /// Lifecycle status; transitions only via the update orchestrator.
    pub status: UpdateStatus,

    // ─── Profile ─────────────────────────────────────────────────────────────
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub avatar_url: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub blog: Option<String>,
    pub public_repos: i32,
    pub followers: i32,
    pub following: i32,

    // ─── Aggregates ──────────────────────────────────────────────────────────
    /// Total contributions attributed to the user across tracked repositories.
    pub total_contribution: i32,
    /// Total stargazers across the user's repositories, forks included.
    pub total_stargazers: i32,
    /// Length of the user's current 1-commit-per-day streak, in days.
    pub continuous_commit_days: i32,
    /// Composite weighted score; see the score module.
    pub total_score: i32,
    pub current_rank: Option<i32>,
    pub previous_rank: Option<i32>,
    pub tier: Tier,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::repository::Entity")]
    Repository,
    #[sea_orm(has_many = "super::user_language::Entity")]
    UserLanguage,
    #[sea_orm(has_many = "super::user_organization::Entity")]
    UserOrganization,
}

impl Related<super::repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repository.def()
    }
}

impl Related<super::user_language::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserLanguage.def()
    }
}

impl Related<super::user_organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserOrganization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
