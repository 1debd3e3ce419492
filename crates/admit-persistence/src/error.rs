//! Persistence layer errors

use thiserror::Error;

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Entity not found
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Number allocation could not produce a unique number within the retry
    /// budget
    #[error("Allocation failed: {0}")]
    Allocation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}
