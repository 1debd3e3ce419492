//! Server configuration structures

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::{ConfigError, Result};

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Network configuration
    pub network: NetworkConfig,
    /// Submission authentication configuration
    pub auth: AuthConfig,
    /// Persistent store configuration
    pub storage: StorageConfig,
    /// Resource limits
    pub limits: LimitsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Server bind address and port
    pub bind_address: String,
    /// Per-connection read timeout in seconds; a stalled client is abandoned
    /// after this long
    pub read_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9000".to_string(),
            read_timeout_secs: 30,
        }
    }
}

/// How submissions are authenticated. Exactly one mode is active per
/// deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthModeKind {
    /// Per-message HMAC tag over the canonical applicant bytes
    Tag,
    /// TLS transport; no per-message tag
    Channel,
}

/// Submission authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Active authentication mode
    pub mode: AuthModeKind,
    /// Shared secret (tag mode)
    pub shared_secret: Option<String>,
    /// TLS certificate chain file, PEM (channel mode)
    pub tls_cert_path: Option<PathBuf>,
    /// TLS private key file, PEM (channel mode)
    pub tls_key_path: Option<PathBuf>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthModeKind::Tag,
            shared_secret: None,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

/// Persistent store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file path
    pub path: String,
    /// Maximum pool connections
    pub max_connections: u32,
    /// Application number prefix
    pub number_prefix: String,
    /// Allocation strategy: "sequence" or "temporal"
    pub numbering: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "applications.db".to_string(),
            max_connections: 32,
            number_prefix: "DBS".to_string(),
            numbering: "sequence".to_string(),
        }
    }
}

/// Resource limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum concurrently handled connections
    pub max_connections: usize,
    /// Maximum request payload size in bytes
    pub max_message_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
            max_message_size: 64 * 1024,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ServerConfig {
    /// Validate the assembled configuration
    pub fn validate(&self) -> Result<()> {
        self.bind_address()?;

        if self.network.read_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "network.read_timeout_secs".to_string(),
                message: "Timeout must be greater than 0".to_string(),
            });
        }

        match self.auth.mode {
            AuthModeKind::Tag => {
                match &self.auth.shared_secret {
                    Some(secret) if !secret.is_empty() => {}
                    _ => {
                        return Err(ConfigError::MissingRequired(
                            "auth.shared_secret is required in tag mode".to_string(),
                        ));
                    }
                }
            }
            AuthModeKind::Channel => {
                if self.auth.tls_cert_path.is_none() {
                    return Err(ConfigError::MissingRequired(
                        "auth.tls_cert_path is required in channel mode".to_string(),
                    ));
                }
                if self.auth.tls_key_path.is_none() {
                    return Err(ConfigError::MissingRequired(
                        "auth.tls_key_path is required in channel mode".to_string(),
                    ));
                }
            }
        }

        match self.storage.numbering.as_str() {
            "sequence" | "temporal" => {}
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "storage.numbering".to_string(),
                    message: format!("Must be \"sequence\" or \"temporal\", got \"{other}\""),
                });
            }
        }

        if self.storage.number_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.number_prefix".to_string(),
                message: "Prefix cannot be empty".to_string(),
            });
        }

        if self.limits.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "limits.max_connections".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.limits.max_message_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "limits.max_message_size".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: "logging.level".to_string(),
                    message: "Must be one of: trace, debug, info, warn, error".to_string(),
                });
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" | "compact" => {}
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: "logging.format".to_string(),
                    message: "Must be one of: json, pretty, compact".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the parsed bind address
    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.network
            .bind_address
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                field: "network.bind_address".to_string(),
                message: format!("Invalid socket address: {e}"),
            })
    }
}
