//! Lifecycle status of a tracked user's update cycle.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where a tracked user currently sits in the update pipeline.
///
/// Transitions are driven exclusively by the update orchestrator: a cycle
/// moves the user to `Updating`, then to `Completed` on success or `Failed`
/// on error. `Waiting` marks users parked behind the deferred-work queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum UpdateStatus {
    /// Never updated.
    #[default]
    #[sea_orm(string_value = "none")]
    None,
    /// Queued for a later update.
    #[sea_orm(string_value = "waiting")]
    Waiting,
    /// An update cycle is in flight.
    #[sea_orm(string_value = "updating")]
    Updating,
    /// The last update cycle finished successfully.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// The last update cycle aborted.
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl std::fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UpdateStatus::None => "none",
            UpdateStatus::Waiting => "waiting",
            UpdateStatus::Updating => "updating",
            UpdateStatus::Completed => "completed",
            UpdateStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        assert_eq!(UpdateStatus::default(), UpdateStatus::None);
    }

    #[test]
    fn test_display() {
        assert_eq!(UpdateStatus::Completed.to_string(), "completed");
        assert_eq!(UpdateStatus::Failed.to_string(), "failed");
    }
}
