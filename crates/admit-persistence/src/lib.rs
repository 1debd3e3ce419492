//! Persistence layer for the ADMIT server
//!
//! Provides the SQLite-backed application store:
//! - connection pool and migrations
//! - atomic application-number allocation
//! - stored application rows (write-once, never mutated)

pub mod database;
pub mod error;
pub mod models;
pub mod store;

pub use database::{Database, DatabaseConfig};
pub use error::{PersistenceError, Result};
pub use models::StoredApplication;
pub use store::{ApplicationStore, NumberingStrategy};
