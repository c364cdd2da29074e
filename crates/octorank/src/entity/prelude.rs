//! Re-exports of all entities for convenient glob imports.

pub use super::blocked_user::Entity as BlockedUser;
pub use super::deferred_user::Entity as DeferredUser;
pub use super::language::Entity as Language;
pub use super::organization::Entity as Organization;
pub use super::queue_status::QueueStatus;
pub use super::rank_entry::Entity as RankEntry;
pub use super::repository::Entity as Repository;
pub use super::tier::Tier;
pub use super::tracked_user::Entity as TrackedUser;
pub use super::update_status::UpdateStatus;
pub use super::user_language::Entity as UserLanguage;
pub use super::user_organization::Entity as UserOrganization;
