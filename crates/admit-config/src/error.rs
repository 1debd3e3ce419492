//! Configuration errors

use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a configuration file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid environment variable override
    #[error("Environment error: {0}")]
    Environment(String),

    /// A field holds an invalid value
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// A required field is missing for the selected mode
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Catch-all validation error
    #[error("Validation error: {0}")]
    Validation(String),
}
