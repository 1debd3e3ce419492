//! Logging configuration and setup
//!
//! Structured logging with configurable level and output format.

use crate::{Result, ServerError};
use admit_config::LoggingConfig;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize the logging system
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    match config.format.as_str() {
        "json" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| ServerError::Startup(format!("Failed to set logger: {e}")))?;
        }
        "pretty" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter)
                .pretty()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| ServerError::Startup(format!("Failed to set logger: {e}")))?;
        }
        "compact" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter)
                .compact()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| ServerError::Startup(format!("Failed to set logger: {e}")))?;
        }
        other => {
            return Err(ServerError::Startup(format!("Unknown log format: {other}")));
        }
    }

    tracing::info!("Logging initialized with level: {}", level);
    Ok(())
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(ServerError::Startup(format!("Invalid log level: {level}"))),
    }
}
