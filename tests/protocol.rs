//! Framing and envelope integration tests.
//!
//! These drive the frame reader/writer through the public API over raw byte
//! buffers, covering stream boundaries the per-module unit tests do not:
//! multiple frames back to back, partial trailing frames, and declared
//! lengths that disagree with the bytes on the wire.

use std::io::Cursor;
use trellis::core::error::{ErrorCode, ProtocolError};
use trellis::protocol::frame::{read_message, write_message, MAX_MESSAGE_SIZE};
use trellis::protocol::message::{
    ErrorResponse, GetRequest, HandshakeRequest, Message, PutRequest, Request, Response,
};
use trellis::protocol::value::EncodedValue;

async fn encode(message: &Message) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    write_message(&mut cursor, message).await.unwrap();
    cursor.into_inner()
}

#[tokio::test]
async fn test_clean_eof_yields_none() {
    let mut reader: &[u8] = &[];
    assert!(read_message(&mut reader).await.unwrap().is_none());
}

#[tokio::test]
async fn test_back_to_back_frames() {
    let first = Message::Request(Request::Handshake(HandshakeRequest {
        username: "admin".to_string(),
        password: "secret".to_string(),
    }));
    let second = Message::Request(Request::Get(GetRequest {
        region: "inventory".to_string(),
        key: EncodedValue::String("widget".to_string()),
    }));

    let mut wire = encode(&first).await;
    wire.extend(encode(&second).await);

    let mut reader: &[u8] = &wire;
    assert_eq!(read_message(&mut reader).await.unwrap(), Some(first));
    assert_eq!(read_message(&mut reader).await.unwrap(), Some(second));
    assert_eq!(read_message(&mut reader).await.unwrap(), None);
}

#[tokio::test]
async fn test_truncated_payload_is_fatal() {
    // Declares five payload bytes but carries three.
    let wire = [0u8, 0, 0, 5, 0x02, 0x02, 0x03];
    let mut reader: &[u8] = &wire;
    let error = read_message(&mut reader).await.unwrap_err();
    assert!(matches!(error, ProtocolError::Framing { .. }));
    assert!(error.is_fatal());
}

#[tokio::test]
async fn test_exact_payload_parses() {
    // Same header with the full five bytes: a get response carrying
    // Short(0x0102).
    let wire = [0u8, 0, 0, 5, 0x02, 0x02, 0x03, 0x01, 0x02];
    let mut reader: &[u8] = &wire;
    let message = read_message(&mut reader).await.unwrap().unwrap();
    assert_eq!(
        message,
        Message::Response(Response::Get(trellis::protocol::message::GetResponse {
            value: EncodedValue::Short(0x0102),
        }))
    );
}

#[tokio::test]
async fn test_zero_length_frame_is_recoverable() {
    let mut wire = vec![0u8, 0, 0, 0];
    wire.extend(
        encode(&Message::Request(Request::Handshake(HandshakeRequest {
            username: "admin".to_string(),
            password: "secret".to_string(),
        })))
        .await,
    );

    let mut reader: &[u8] = &wire;
    let error = read_message(&mut reader).await.unwrap_err();
    assert!(matches!(error, ProtocolError::MalformedEnvelope { .. }));
    assert!(!error.is_fatal());

    // The stream stays aligned; the next frame still parses.
    assert!(read_message(&mut reader).await.unwrap().is_some());
}

#[tokio::test]
async fn test_oversized_declared_length_is_fatal() {
    let wire = (MAX_MESSAGE_SIZE as u32 + 1).to_be_bytes();
    let mut reader: &[u8] = &wire;
    let error = read_message(&mut reader).await.unwrap_err();
    assert!(matches!(error, ProtocolError::Framing { .. }));
    assert!(error.is_fatal());
}

#[tokio::test]
async fn test_garbage_payload_is_recoverable() {
    // Well-framed, but the payload is not an envelope.
    let wire = [0u8, 0, 0, 2, 0xff, 0xff];
    let mut reader: &[u8] = &wire;
    let error = read_message(&mut reader).await.unwrap_err();
    assert!(matches!(error, ProtocolError::MalformedEnvelope { .. }));
    assert!(!error.is_fatal());
}

#[tokio::test]
async fn test_representative_round_trips() {
    let messages = vec![
        Message::Request(Request::Put(PutRequest {
            region: "inventory".to_string(),
            key: EncodedValue::Long(-7),
            value: EncodedValue::Custom {
                format: 0x0100,
                data: bytes::Bytes::from_static(b"\x00\x01\x02"),
            },
        })),
        Message::Response(Response::Error(ErrorResponse {
            code: ErrorCode::AccessDenied,
            message: "put requires DATA:WRITE".to_string(),
        })),
        Message::Response(Response::Put(trellis::protocol::message::PutResponse)),
    ];

    for message in messages {
        let wire = encode(&message).await;
        let mut reader: &[u8] = &wire;
        assert_eq!(read_message(&mut reader).await.unwrap(), Some(message));
    }
}
