//! The aggregation and reconciliation pipeline.
//!
//! [`update_user`] runs one user's full cycle: rate check, profile fetch,
//! user-record reconciliation, repository and organization merging,
//! language aggregation, then score/rank/tier computation. The batch module
//! sweeps many users and rebuilds the ranking snapshots.

pub mod batch;
pub mod context;
pub mod contributor;
mod engine;
mod error;
pub mod languages;
pub mod orgs;
pub mod ranking;
pub mod repos;

pub use context::{UpdateContext, UpdateOptions};
pub use engine::update_user;
pub use error::SyncError;
