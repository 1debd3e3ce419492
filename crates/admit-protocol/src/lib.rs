//! ADMIT wire protocol
//!
//! One request, one response, then the connection closes. Requests and
//! responses are UTF-8 JSON payloads behind a 4-byte big-endian length
//! prefix:
//!
//! ```text
//! ┌───────────────┬──────────────────────────────┐
//! │ Length (u32)  │ Payload (UTF-8 JSON)         │
//! └───────────────┴──────────────────────────────┘
//! ```
//!
//! Tag-mode request payloads wrap the applicant object in a
//! [`types::SubmissionEnvelope`] carrying an HMAC-SHA256 tag over the
//! applicant's canonical encoding; channel-mode payloads are the bare
//! applicant object and the TLS session supplies the integrity guarantee.

pub mod auth;
pub mod canonical;
pub mod error;
pub mod framing;
pub mod types;
pub mod validate;

pub use auth::{compute_tag, verify_tag};
pub use canonical::canonical_bytes;
pub use error::{ProtocolError, Result};
pub use framing::{FrameCodec, DEFAULT_MAX_PAYLOAD_SIZE, LENGTH_PREFIX_SIZE};
pub use types::{ApplicationRecord, SubmissionEnvelope, SubmissionOutcome};
pub use validate::{validate_applicant, MAX_NAME_LEN, OFFERED_COURSES};
