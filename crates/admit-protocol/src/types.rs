//! Wire-level and validated record types for ADMIT submissions

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A validated course application.
///
/// Constructed only by [`crate::validate::validate_applicant`]; nothing
/// downstream of the validator consumes raw untyped input. Immutable once
/// built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    /// Applicant full name (non-empty, at most 200 characters)
    pub name: String,
    /// Postal address (optional)
    pub address: Option<String>,
    /// Educational qualifications (non-empty)
    pub qualifications: String,
    /// Offered course the applicant is applying for
    pub course: String,
    /// Intended start year (2000..=2100)
    pub start_year: i32,
    /// Intended start month (1..=12)
    pub start_month: u8,
}

/// Tag-mode request payload as received from the wire.
///
/// The applicant object is kept as raw JSON so the authentication tag can be
/// recomputed over exactly the bytes the client canonicalized, before any
/// typed interpretation happens.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmissionEnvelope {
    /// The applicant object, untyped until validated
    pub applicant: Value,
    /// Client-supplied identifier; untrusted, used for logging only
    #[serde(default)]
    pub client_id: String,
    /// Hex-encoded HMAC-SHA256 over the canonical applicant bytes
    pub hmac: String,
}

/// One response message per connection, success or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmissionOutcome {
    /// Application accepted and stored
    Ok {
        /// The permanently assigned application number
        application_number: String,
    },
    /// Application rejected; `message` says why (generically, for auth and
    /// storage failures)
    Error { message: String },
}

impl SubmissionOutcome {
    /// Success response carrying the allocated number
    pub fn ok(application_number: impl Into<String>) -> Self {
        Self::Ok {
            application_number: application_number.into(),
        }
    }

    /// Failure response with a client-facing message
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_wire_shape() {
        let ok = SubmissionOutcome::ok("DBS-2025-09-000001");
        let json = serde_json::to_string(&ok).unwrap();
        assert_eq!(
            json,
            r#"{"status":"ok","application_number":"DBS-2025-09-000001"}"#
        );

        let err = SubmissionOutcome::error("Name too long");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"status":"error","message":"Name too long"}"#);
    }

    #[test]
    fn test_envelope_client_id_defaults_empty() {
        let env: SubmissionEnvelope =
            serde_json::from_str(r#"{"applicant":{},"hmac":"00"}"#).unwrap();
        assert_eq!(env.client_id, "");
    }
}
