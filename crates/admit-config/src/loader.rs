//! Configuration loading and parsing

use std::env;
use std::fs;
use std::path::Path;

use crate::{AuthModeKind, ConfigError, Result, ServerConfig};

/// Configuration loader with support for files and environment variables
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file, then apply `ADMIT_*` environment
    /// overrides and validate.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ServerConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Configuration file not found: {}", path.display()),
            )));
        }

        let content = fs::read_to_string(path)?;
        let mut config: ServerConfig = toml::from_str(&content)?;

        Self::apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<ServerConfig> {
        let mut config = ServerConfig::default();
        Self::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with file fallback to environment
    pub fn load() -> Result<ServerConfig> {
        let config_paths = [
            "admit-server.toml",
            "config/admit-server.toml",
            "/etc/admit/server.toml",
        ];

        for path in &config_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        if let Ok(config_file) = env::var("ADMIT_CONFIG_FILE") {
            return Self::from_file(config_file);
        }

        Self::from_env()
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(config: &mut ServerConfig) -> Result<()> {
        if let Ok(bind_address) = env::var("ADMIT_BIND_ADDRESS") {
            config.network.bind_address = bind_address;
        }

        if let Ok(read_timeout) = env::var("ADMIT_READ_TIMEOUT_SECS") {
            config.network.read_timeout_secs = read_timeout.parse().map_err(|e| {
                ConfigError::Environment(format!("Invalid ADMIT_READ_TIMEOUT_SECS: {e}"))
            })?;
        }

        if let Ok(mode) = env::var("ADMIT_AUTH_MODE") {
            config.auth.mode = match mode.to_lowercase().as_str() {
                "tag" => AuthModeKind::Tag,
                "channel" => AuthModeKind::Channel,
                other => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid ADMIT_AUTH_MODE: {other}"
                    )));
                }
            };
        }

        if let Ok(secret) = env::var("ADMIT_SHARED_SECRET") {
            config.auth.shared_secret = Some(secret);
        }

        if let Ok(cert_path) = env::var("ADMIT_TLS_CERT_PATH") {
            config.auth.tls_cert_path = Some(cert_path.into());
        }

        if let Ok(key_path) = env::var("ADMIT_TLS_KEY_PATH") {
            config.auth.tls_key_path = Some(key_path.into());
        }

        if let Ok(db_path) = env::var("ADMIT_DB_PATH") {
            config.storage.path = db_path;
        }

        if let Ok(prefix) = env::var("ADMIT_NUMBER_PREFIX") {
            config.storage.number_prefix = prefix;
        }

        if let Ok(numbering) = env::var("ADMIT_NUMBERING") {
            config.storage.numbering = numbering;
        }

        if let Ok(max_connections) = env::var("ADMIT_MAX_CONNECTIONS") {
            config.limits.max_connections = max_connections.parse().map_err(|e| {
                ConfigError::Environment(format!("Invalid ADMIT_MAX_CONNECTIONS: {e}"))
            })?;
        }

        if let Ok(max_message_size) = env::var("ADMIT_MAX_MESSAGE_SIZE") {
            config.limits.max_message_size = max_message_size.parse().map_err(|e| {
                ConfigError::Environment(format!("Invalid ADMIT_MAX_MESSAGE_SIZE: {e}"))
            })?;
        }

        if let Ok(log_level) = env::var("ADMIT_LOG_LEVEL") {
            config.logging.level = log_level;
        }

        if let Ok(log_format) = env::var("ADMIT_LOG_FORMAT") {
            config.logging.format = log_format;
        }

        Ok(())
    }

    /// Write a default configuration file
    pub fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = ServerConfig::default();
        let toml_content = toml::to_string_pretty(&config)
            .map_err(|e| ConfigError::Validation(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_content)?;
        Ok(())
    }
}
