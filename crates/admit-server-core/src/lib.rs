//! ADMIT server core
//!
//! Connection dispatch, the per-connection request pipeline, TLS acceptor
//! construction and logging setup. The listener accepts; everything else
//! happens in per-connection tasks that own their transient state for one
//! request-response cycle and nothing longer.

pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod tls;

pub use connection::{handle_connection, AuthMode};
pub use dispatcher::ConnectionDispatcher;
pub use error::{Result, ServerError};
pub use logging::init_logging;

use admit_config::{AuthModeKind, ServerConfig};
use admit_persistence::ApplicationStore;
use std::time::Duration;
use tokio_rustls::TlsAcceptor;

/// Shared state for the request pipeline.
///
/// The store is the single shared mutable resource; everything else here is
/// read-only after startup.
pub struct AppState {
    /// Active authentication mode
    pub auth: AuthMode,
    /// The application store; all persistence goes through it
    pub store: ApplicationStore,
    /// Maximum accepted request payload size
    pub max_message_size: usize,
    /// Per-connection read timeout
    pub read_timeout: Duration,
}

impl AppState {
    /// Assemble pipeline state from validated configuration.
    ///
    /// In channel mode this loads the certificate and key, so a missing or
    /// malformed pair fails here, before any connection is accepted.
    pub fn from_config(
        config: &ServerConfig,
        store: ApplicationStore,
    ) -> Result<(Self, Option<TlsAcceptor>)> {
        let (auth, acceptor) = match config.auth.mode {
            AuthModeKind::Tag => {
                let secret = config.auth.shared_secret.as_ref().ok_or_else(|| {
                    ServerError::Startup("shared secret not configured".to_string())
                })?;
                (
                    AuthMode::Tag {
                        secret: secret.clone().into_bytes(),
                    },
                    None,
                )
            }
            AuthModeKind::Channel => {
                let cert_path = config.auth.tls_cert_path.as_ref().ok_or_else(|| {
                    ServerError::Startup("TLS certificate not configured".to_string())
                })?;
                let key_path = config.auth.tls_key_path.as_ref().ok_or_else(|| {
                    ServerError::Startup("TLS key not configured".to_string())
                })?;
                let acceptor = tls::build_acceptor(cert_path, key_path)?;
                (AuthMode::Channel, Some(acceptor))
            }
        };

        Ok((
            Self {
                auth,
                store,
                max_message_size: config.limits.max_message_size,
                read_timeout: Duration::from_secs(config.network.read_timeout_secs),
            },
            acceptor,
        ))
    }
}
