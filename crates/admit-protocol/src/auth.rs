//! Submission authentication
//!
//! Tag-mode deployments authenticate each submission with an HMAC-SHA256 tag
//! computed by the client over the canonical applicant bytes and verified
//! here against the shared secret. Verification is constant-time and a
//! mismatch reveals nothing about why it mismatched.

use crate::error::{ProtocolError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex-encoded submission tag for the given canonical bytes.
pub fn compute_tag(secret: &[u8], canonical: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(canonical);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a received hex tag against the canonical bytes.
///
/// Any failure (undecodable hex, wrong length, mismatch) collapses to
/// [`ProtocolError::AuthenticationFailed`].
pub fn verify_tag(secret: &[u8], canonical: &[u8], received_hex: &str) -> Result<()> {
    let received = hex::decode(received_hex).map_err(|_| ProtocolError::AuthenticationFailed)?;

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(canonical);
    let expected = mac.finalize().into_bytes();

    if expected.ct_eq(&received).into() {
        Ok(())
    } else {
        Err(ProtocolError::AuthenticationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"very_secret_key_change_me";

    #[test]
    fn test_tag_roundtrip() {
        let canonical = br#"{"course":"MSc Data Analytics","name":"Jane Doe"}"#;
        let tag = compute_tag(SECRET, canonical);
        assert_eq!(tag.len(), 64); // 256-bit output, hex-encoded
        assert!(verify_tag(SECRET, canonical, &tag).is_ok());
    }

    #[test]
    fn test_single_byte_tamper_rejected() {
        let canonical = br#"{"course":"MSc Data Analytics","name":"Jane Doe"}"#.to_vec();
        let tag = compute_tag(SECRET, &canonical);

        for i in 0..canonical.len() {
            let mut tampered = canonical.clone();
            tampered[i] ^= 0x01;
            assert!(
                matches!(
                    verify_tag(SECRET, &tampered, &tag),
                    Err(ProtocolError::AuthenticationFailed)
                ),
                "tamper at byte {i} was accepted"
            );
        }
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let canonical = br#"{"name":"Jane"}"#;
        let tag = compute_tag(SECRET, canonical);
        assert!(verify_tag(b"other_secret", canonical, &tag).is_err());
    }

    #[test]
    fn test_malformed_tags_rejected() {
        let canonical = br#"{"name":"Jane"}"#;
        assert!(verify_tag(SECRET, canonical, "deadbeef").is_err());
        assert!(verify_tag(SECRET, canonical, "not hex at all").is_err());
        assert!(verify_tag(SECRET, canonical, "").is_err());

        // Truncated but otherwise valid prefix of the real tag
        let tag = compute_tag(SECRET, canonical);
        assert!(verify_tag(SECRET, canonical, &tag[..32]).is_err());
    }
}
