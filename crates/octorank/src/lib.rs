//! Octorank - a GitHub user activity aggregator and ranking engine.
//!
//! This library fetches a tracked user's profile, organizations and
//! repositories from the GitHub REST API under a shared rate budget,
//! reconciles the fetched state against a local store, and derives a
//! composite score, rank and tier for every tracked user.
//!
//! # Features
//!
//! - `sqlite` - Enables the SQLite driver for the record store.
//! - `migrate` - Enables schema migration support. When enabled, use
//!   [`connect_and_migrate`] to bring the schema up to date on connection.
//!
//! # Example
//!
//! ```ignore
//! use octorank::{connect_and_migrate, gate::LiveRateGate, github::GithubClient};
//! use octorank::sync::{UpdateContext, UpdateOptions, update_user};
//!
//! let db = connect_and_migrate("sqlite://octorank.db?mode=rwc").await?;
//! let client = GithubClient::new(&token)?;
//! let gate = LiveRateGate::new(client.clone());
//!
//! let ctx = UpdateContext::new(&db, &client, &gate);
//! let user = update_user(&ctx, "octocat").await?;
//! println!("{} scored {} (rank {:?})", user.username, user.total_score, user.current_rank);
//! ```

pub mod db;
pub mod entity;
pub mod gate;
pub mod github;
pub mod notify;
pub mod score;
pub mod store;
pub mod streak;
pub mod sync;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use gate::{ApiRateLimiter, FixedRateGate, LiveRateGate, RateGate};
pub use github::{GithubClient, GithubError};
pub use store::StoreError;
pub use sync::SyncError;
