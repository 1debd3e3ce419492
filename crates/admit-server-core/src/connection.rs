//! Per-connection request handling
//!
//! One request, one response, then close. The lifecycle runs
//! read → authenticate → validate → persist → respond; any stage can short
//! out straight to the response with a failure payload. Nothing here is
//! allowed to escape the connection's task: framing failures close the
//! stream silently (there is no coherent response to send), everything else
//! becomes exactly one error response.

use crate::AppState;
use admit_protocol::{
    canonical_bytes, validate_applicant, verify_tag, FrameCodec, ProtocolError,
    SubmissionEnvelope, SubmissionOutcome,
};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};

/// Submission authentication, resolved from configuration at startup.
///
/// Exactly one mode is active per deployment; the pipeline downstream of
/// authentication is agnostic to which.
pub enum AuthMode {
    /// Verify a per-message HMAC tag against the shared secret
    Tag { secret: Vec<u8> },
    /// The TLS channel itself authenticates the stream; payloads carry the
    /// bare applicant object
    Channel,
}

/// Drive one connection through its whole lifecycle.
///
/// Works over plain TCP or a TLS stream; the dispatcher has already done any
/// handshake.
pub async fn handle_connection<S>(stream: S, peer: SocketAddr, state: Arc<AppState>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    debug!(%peer, "handling connection");

    let mut framed = Framed::new(stream, FrameCodec::with_max_size(state.max_message_size));

    let payload = match timeout(state.read_timeout, framed.next()).await {
        Err(_) => {
            warn!(%peer, timeout = ?state.read_timeout, "read timed out, abandoning connection");
            return;
        }
        Ok(None) => {
            debug!(%peer, "connection closed without a request");
            return;
        }
        Ok(Some(Err(e))) => {
            warn!(%peer, error = %e, "framing error, closing without response");
            return;
        }
        Ok(Some(Ok(payload))) => payload,
    };

    let outcome = process_request(&payload, peer, &state).await;

    let response = match serde_json::to_vec(&outcome) {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => {
            error!(%peer, error = %e, "failed to encode response");
            return;
        }
    };

    if let Err(e) = framed.send(response).await {
        warn!(%peer, error = %e, "failed to send response");
    }

    debug!(%peer, "connection finished");
}

/// Decode, authenticate, validate and persist one request payload.
async fn process_request(payload: &[u8], peer: SocketAddr, state: &AppState) -> SubmissionOutcome {
    let (applicant, client_id) = match &state.auth {
        AuthMode::Tag { secret } => {
            let envelope: SubmissionEnvelope = match serde_json::from_slice(payload) {
                Ok(envelope) => envelope,
                Err(e) => {
                    debug!(%peer, error = %e, "undecodable request payload");
                    return SubmissionOutcome::error("Invalid request");
                }
            };

            let canonical = match canonical_bytes(&envelope.applicant) {
                Ok(canonical) => canonical,
                Err(e) => {
                    debug!(%peer, error = %e, "applicant not canonicalizable");
                    return SubmissionOutcome::error("Invalid request");
                }
            };

            if verify_tag(secret, &canonical, &envelope.hmac).is_err() {
                warn!(%peer, client_id = %envelope.client_id, "HMAC verification failed");
                return SubmissionOutcome::error("HMAC verification failed");
            }

            let client_id = (!envelope.client_id.is_empty()).then_some(envelope.client_id);
            (envelope.applicant, client_id)
        }
        AuthMode::Channel => {
            let applicant: Value = match serde_json::from_slice(payload) {
                Ok(applicant) => applicant,
                Err(e) => {
                    debug!(%peer, error = %e, "undecodable request payload");
                    return SubmissionOutcome::error("Invalid request");
                }
            };
            (applicant, None)
        }
    };

    let record = match validate_applicant(&applicant) {
        Ok(record) => record,
        Err(e @ ProtocolError::Validation { .. }) => {
            debug!(%peer, reason = %e, "validation failed");
            return SubmissionOutcome::error(e.to_string());
        }
        Err(e) => {
            debug!(%peer, error = %e, "validation failed unexpectedly");
            return SubmissionOutcome::error("Invalid request");
        }
    };

    match state
        .store
        .allocate_and_store(&record, client_id.as_deref())
        .await
    {
        Ok(number) => {
            info!(
                %peer,
                client_id = client_id.as_deref().unwrap_or("-"),
                application_number = %number,
                "application accepted"
            );
            SubmissionOutcome::ok(number)
        }
        Err(e) => {
            // Details stay server-side; the client gets a generic message
            error!(%peer, error = %e, "failed to store application");
            SubmissionOutcome::error("internal storage error")
        }
    }
}
