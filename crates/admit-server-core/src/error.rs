//! Server error types

use thiserror::Error;

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] admit_config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] admit_protocol::ProtocolError),

    /// Persistence error
    #[error("Persistence error: {0}")]
    Persistence(#[from] admit_persistence::PersistenceError),

    /// TLS setup error
    #[error("TLS error: {0}")]
    Tls(String),

    /// Server startup failed
    #[error("Server startup failed: {0}")]
    Startup(String),
}
