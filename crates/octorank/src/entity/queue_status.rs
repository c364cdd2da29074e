//! Status of a deferred-work queue item.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Deferred-work items are drained at-least-once: `Ready` and `Fail` items
/// are both picked up by the next drain pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum QueueStatus {
    /// Waiting to be retried.
    #[default]
    #[sea_orm(string_value = "ready")]
    Ready,
    /// The retry succeeded.
    #[sea_orm(string_value = "success")]
    Success,
    /// The retry failed; will be picked up again.
    #[sea_orm(string_value = "fail")]
    Fail,
}
