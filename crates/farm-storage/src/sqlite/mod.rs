//! SQLite-backed storage implementation.

mod activity;
mod config;
mod documents;
pub mod schema;
mod sessions;
mod store;
mod transaction;

pub use store::SqliteStore;
