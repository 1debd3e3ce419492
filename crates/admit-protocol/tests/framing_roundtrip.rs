//! Framing round-trips through a real duplex stream

use admit_protocol::{FrameCodec, ProtocolError};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio_util::codec::{FramedRead, FramedWrite};

#[tokio::test]
async fn roundtrip_arbitrary_payloads() {
    // Large enough to hold every queued frame; sends would otherwise block
    // with nothing reading yet
    let (client, server) = tokio::io::duplex(64 * 1024);
    let mut writer = FramedWrite::new(client, FrameCodec::new());
    let mut reader = FramedRead::new(server, FrameCodec::new());

    let payloads: Vec<Vec<u8>> = vec![
        b"".to_vec(),
        b"x".to_vec(),
        br#"{"applicant":{"name":"Jane"}}"#.to_vec(),
        vec![0u8; 4096],
        (0..=255u8).collect(),
    ];

    for payload in &payloads {
        writer.send(Bytes::copy_from_slice(payload)).await.unwrap();
    }
    drop(writer);

    for payload in &payloads {
        let frame = reader.next().await.unwrap().unwrap();
        assert_eq!(&frame[..], payload.as_slice());
    }
    assert!(reader.next().await.is_none());
}

#[tokio::test]
async fn close_mid_prefix_surfaces_framing_error() {
    let (mut client, server) = tokio::io::duplex(64);
    let mut reader = FramedRead::new(server, FrameCodec::new());

    // Two bytes of a four-byte prefix, then close
    client.write_all(&[0x00, 0x00]).await.unwrap();
    drop(client);

    let result = reader.next().await.unwrap();
    assert!(matches!(result, Err(ProtocolError::ConnectionTerminated)));
}

#[tokio::test]
async fn close_mid_payload_surfaces_framing_error() {
    let (mut client, server) = tokio::io::duplex(64);
    let mut reader = FramedRead::new(server, FrameCodec::new());

    // Prefix promises 10 bytes, only 3 arrive
    client.write_all(&10u32.to_be_bytes()).await.unwrap();
    client.write_all(b"abc").await.unwrap();
    drop(client);

    let result = reader.next().await.unwrap();
    assert!(matches!(result, Err(ProtocolError::ConnectionTerminated)));
}

#[tokio::test]
async fn clean_close_is_end_of_stream() {
    let (client, server) = tokio::io::duplex(64);
    let mut reader = FramedRead::new(server, FrameCodec::new());
    drop(client);

    assert!(reader.next().await.is_none());
}
