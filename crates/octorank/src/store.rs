//! Data access over the record store.
//!
//! Free functions grouped by aggregate, all taking a `&DatabaseConnection`.
//! The store is treated as a key-addressable record collection with
//! filter/update/delete and aggregate operations; everything schema-shaped
//! lives in the entity module.

mod errors;
pub mod languages;
pub mod orgs;
pub mod queue;
pub mod ranks;
pub mod repos;
pub mod users;

pub use errors::{Result, StoreError};
