//! RankEntry entity - snapshot rows for per-signal leaderboards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per (signal, position): which user currently occupies that
/// leaderboard slot and with what score. The snapshot for a signal is
/// rebuilt wholesale on every ranking pass, inside a single transaction.
///
/// Signals are plain strings: the aggregate field names ("total_score",
/// "followers", ...) plus per-language boards ("lang-rust", "lang-go", ...).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rank_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub signal: String,
    /// 1-indexed leaderboard position.
    pub position: i32,
    pub user_id: Option<Uuid>,
    pub score: i64,
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
