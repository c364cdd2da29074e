//! SeaORM entity definitions for the octorank database schema.

pub mod blocked_user;
pub mod deferred_user;
pub mod language;
pub mod organization;
pub mod prelude;
pub mod queue_status;
pub mod rank_entry;
pub mod repository;
pub mod tier;
pub mod tracked_user;
pub mod update_status;
pub mod user_language;
pub mod user_organization;
