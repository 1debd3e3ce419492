//! Configuration for the ADMIT server
//!
//! TOML files with environment-variable overrides; everything is validated
//! before the server touches it. Secrets and certificate paths are
//! configuration, never request data.

pub mod cli;
pub mod error;
pub mod loader;
pub mod server;

pub use cli::Cli;
pub use error::{ConfigError, Result};
pub use loader::ConfigLoader;
pub use server::{
    AuthConfig, AuthModeKind, LimitsConfig, LoggingConfig, NetworkConfig, ServerConfig,
    StorageConfig,
};
