//! Length-prefixed message framing
//!
//! Every ADMIT message on the wire is a 4-byte unsigned big-endian length
//! prefix followed by exactly that many payload bytes. A zero-length prefix
//! is a legal empty message. The decoder enforces a maximum payload size from
//! the prefix alone, before buffering anything, so an arbitrarily large
//! declared length cannot exhaust memory.

use crate::error::{ProtocolError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Size of the length prefix in bytes
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default maximum payload size (64 KiB)
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 64 * 1024;

/// Tokio codec for streaming ADMIT frames
#[derive(Debug)]
pub struct FrameCodec {
    /// Maximum payload size to accept
    max_payload_size: usize,
    /// Current state of decoder
    state: DecodeState,
}

#[derive(Debug, Clone, Copy)]
enum DecodeState {
    /// Waiting for the 4-byte length prefix
    Length,
    /// Waiting for the payload of the given size
    Payload(usize),
}

impl FrameCodec {
    /// Create a new frame codec with the default maximum payload size
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_PAYLOAD_SIZE)
    }

    /// Create a new frame codec with a custom maximum payload size
    pub fn with_max_size(max_payload_size: usize) -> Self {
        Self {
            max_payload_size,
            state: DecodeState::Length,
        }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        loop {
            match self.state {
                DecodeState::Length => {
                    if src.len() < LENGTH_PREFIX_SIZE {
                        return Ok(None);
                    }

                    let size =
                        u32::from_be_bytes([src[0], src[1], src[2], src[3]]) as usize;

                    if size > self.max_payload_size {
                        return Err(ProtocolError::FrameTooLarge {
                            size,
                            max: self.max_payload_size,
                        });
                    }

                    src.advance(LENGTH_PREFIX_SIZE);
                    self.state = DecodeState::Payload(size);
                }

                DecodeState::Payload(size) => {
                    if src.len() < size {
                        src.reserve(size - src.len());
                        return Ok(None);
                    }

                    let payload = src.split_to(size).freeze();
                    self.state = DecodeState::Length;
                    return Ok(Some(payload));
                }
            }
        }
    }

    /// On EOF, a clean boundary between frames is a normal close; anything
    /// else (mid-prefix or mid-payload) is a terminated connection.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }

        match self.state {
            DecodeState::Length if src.is_empty() => Ok(None),
            _ => Err(ProtocolError::ConnectionTerminated),
        }
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        if item.len() > self.max_payload_size {
            return Err(ProtocolError::FrameTooLarge {
                size: item.len(),
                max: self.max_payload_size,
            });
        }

        dst.reserve(LENGTH_PREFIX_SIZE + item.len());
        dst.put_u32(item.len() as u32);
        dst.extend_from_slice(&item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(payload: &[u8]) -> Bytes {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(Bytes::copy_from_slice(payload), &mut buf).unwrap();
        codec.decode(&mut buf).unwrap().expect("complete frame")
    }

    #[test]
    fn test_roundtrip_preserves_bytes() {
        let payload = br#"{"status":"ok"}"#;
        assert_eq!(roundtrip(payload), payload.as_slice());
    }

    #[test]
    fn test_empty_message_is_legal() {
        let frame = roundtrip(b"");
        assert!(frame.is_empty());
    }

    #[test]
    fn test_partial_frame_waits_for_more() {
        let mut codec = FrameCodec::new();
        let mut full = BytesMut::new();
        codec
            .encode(Bytes::from_static(b"hello world"), &mut full)
            .unwrap();

        let mut buf = BytesMut::new();

        // Half the prefix
        buf.extend_from_slice(&full[..2]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        // Rest of the prefix, half the payload
        buf.extend_from_slice(&full[2..9]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        // Remainder
        buf.extend_from_slice(&full[9..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), b"hello world".as_slice());
    }

    #[test]
    fn test_two_frames_in_one_buffer() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(Bytes::from_static(b"first"), &mut buf).unwrap();
        codec.encode(Bytes::from_static(b"second"), &mut buf).unwrap();

        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), b"first".as_slice());
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), b"second".as_slice());
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_oversized_prefix_rejected_before_buffering() {
        let mut codec = FrameCodec::with_max_size(16);
        let mut buf = BytesMut::new();
        buf.put_u32(17);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::FrameTooLarge { size: 17, max: 16 })
        ));
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let mut codec = FrameCodec::with_max_size(4);
        let mut buf = BytesMut::new();
        assert!(codec.encode(Bytes::from_static(b"12345"), &mut buf).is_err());
    }

    #[test]
    fn test_eof_mid_prefix_is_terminated() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(&[0u8, 0][..]);
        assert!(matches!(
            codec.decode_eof(&mut buf),
            Err(ProtocolError::ConnectionTerminated)
        ));
    }

    #[test]
    fn test_eof_mid_payload_is_terminated() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        buf.put_u32(10);
        buf.extend_from_slice(b"only5");
        assert!(matches!(
            codec.decode_eof(&mut buf),
            Err(ProtocolError::ConnectionTerminated)
        ));
    }

    #[test]
    fn test_eof_between_frames_is_clean() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }
}
