//! Error types for the ADMIT protocol

use thiserror::Error;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Error types for protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Stream closed before a complete frame arrived
    #[error("connection terminated mid-frame")]
    ConnectionTerminated,

    /// Declared payload length exceeds the configured maximum
    #[error("frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// Message encoding/decoding errors
    #[error("codec error: {message}")]
    Codec { message: String },

    /// Submission tag did not verify against the shared secret
    #[error("HMAC verification failed")]
    AuthenticationFailed,

    /// Submitted record failed a validation rule
    #[error("{reason}")]
    Validation { reason: String },

    /// Network and transport errors
    #[error("transport error: {message}")]
    Transport { message: String },
}

impl ProtocolError {
    /// Create a codec error
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ProtocolError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport {
            message: format!("IO error: {err}"),
        }
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::codec(format!("JSON error: {err}"))
    }
}
