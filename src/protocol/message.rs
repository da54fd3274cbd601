//! Envelope tagged unions: messages, requests, and responses.
//!
//! The envelope is a closed union over message kind; requests are a closed
//! union over the operation discriminant, responses over the response tag.
//! Exactly one variant is active per instance, and asking an envelope for the
//! wrong variant is an error, never a silent default.

use crate::core::error::{ErrorCode, ProtocolError, ProtocolResult};
use crate::protocol::value::EncodedValue;
use crate::protocol::{put_str16, take_str16, take_u16, take_u8};
use bytes::{BufMut, Bytes, BytesMut};

const KIND_REQUEST: u8 = 0x01;
const KIND_RESPONSE: u8 = 0x02;

const TAG_ERROR: u8 = 0x00;

/// Operation discriminants carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Handshake,
    Get,
    Put,
    Remove,
}

impl OperationKind {
    /// Wire discriminant byte.
    pub fn discriminant(self) -> u8 {
        match self {
            Self::Handshake => 0x01,
            Self::Get => 0x02,
            Self::Put => 0x03,
            Self::Remove => 0x04,
        }
    }

    /// Parse a wire discriminant.
    pub fn from_discriminant(discriminant: u8) -> Option<Self> {
        match discriminant {
            0x01 => Some(Self::Handshake),
            0x02 => Some(Self::Get),
            0x03 => Some(Self::Put),
            0x04 => Some(Self::Remove),
            _ => None,
        }
    }

    /// Operation name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Handshake => "handshake",
            Self::Get => "get",
            Self::Put => "put",
            Self::Remove => "remove",
        }
    }
}

/// Outermost wire message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Request(Request),
    Response(Response),
}

/// Client request union.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Handshake(HandshakeRequest),
    Get(GetRequest),
    Put(PutRequest),
    Remove(RemoveRequest),
}

/// Handshake credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRequest {
    pub username: String,
    pub password: String,
}

/// Retrieve one entry from a region.
#[derive(Debug, Clone, PartialEq)]
pub struct GetRequest {
    pub region: String,
    pub key: EncodedValue,
}

/// Store one entry in a region.
#[derive(Debug, Clone, PartialEq)]
pub struct PutRequest {
    pub region: String,
    pub key: EncodedValue,
    pub value: EncodedValue,
}

/// Remove one entry from a region.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveRequest {
    pub region: String,
    pub key: EncodedValue,
}

impl Request {
    /// Operation discriminant of the active variant.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Handshake(_) => OperationKind::Handshake,
            Self::Get(_) => OperationKind::Get,
            Self::Put(_) => OperationKind::Put,
            Self::Remove(_) => OperationKind::Remove,
        }
    }

    /// Extract the handshake variant.
    pub fn into_handshake(self) -> ProtocolResult<HandshakeRequest> {
        match self {
            Self::Handshake(request) => Ok(request),
            other => Err(wrong_variant("handshake", other.kind())),
        }
    }

    /// Extract the get variant.
    pub fn into_get(self) -> ProtocolResult<GetRequest> {
        match self {
            Self::Get(request) => Ok(request),
            other => Err(wrong_variant("get", other.kind())),
        }
    }

    /// Extract the put variant.
    pub fn into_put(self) -> ProtocolResult<PutRequest> {
        match self {
            Self::Put(request) => Ok(request),
            other => Err(wrong_variant("put", other.kind())),
        }
    }

    /// Extract the remove variant.
    pub fn into_remove(self) -> ProtocolResult<RemoveRequest> {
        match self {
            Self::Remove(request) => Ok(request),
            other => Err(wrong_variant("remove", other.kind())),
        }
    }
}

fn wrong_variant(expected: &str, actual: OperationKind) -> ProtocolError {
    ProtocolError::invalid(format!(
        "expected {} request, envelope carries {}",
        expected,
        actual.name()
    ))
}

/// Server response union.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Error(ErrorResponse),
    Handshake(HandshakeResponse),
    Get(GetResponse),
    Put(PutResponse),
    Remove(RemoveResponse),
}

/// Reportable failure sent back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

impl From<ProtocolError> for ErrorResponse {
    fn from(error: ProtocolError) -> Self {
        Self {
            code: error.error_code(),
            message: error.to_string(),
        }
    }
}

/// Handshake outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeResponse {
    pub authenticated: bool,
}

/// Value retrieved by a get operation.
#[derive(Debug, Clone, PartialEq)]
pub struct GetResponse {
    pub value: EncodedValue,
}

/// Acknowledgement of a put operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutResponse;

/// Outcome of a remove operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveResponse {
    pub removed: bool,
}

impl Message {
    /// Serialize this message into one envelope payload.
    pub fn encode(&self) -> ProtocolResult<Bytes> {
        let mut buf = BytesMut::new();
        match self {
            Self::Request(request) => {
                buf.put_u8(KIND_REQUEST);
                request.encode(&mut buf)?;
            }
            Self::Response(response) => {
                buf.put_u8(KIND_RESPONSE);
                response.encode(&mut buf)?;
            }
        }
        Ok(buf.freeze())
    }

    /// Parse one envelope payload.
    ///
    /// The whole payload must be consumed; trailing bytes are malformed.
    pub fn decode(mut payload: Bytes) -> ProtocolResult<Self> {
        let kind = take_u8(&mut payload)?;
        let message = match kind {
            KIND_REQUEST => Self::Request(Request::decode(&mut payload)?),
            KIND_RESPONSE => Self::Response(Response::decode(&mut payload)?),
            kind => {
                return Err(ProtocolError::malformed(format!(
                    "unknown message kind 0x{kind:02x}"
                )))
            }
        };
        if !payload.is_empty() {
            return Err(ProtocolError::malformed("trailing bytes after envelope"));
        }
        Ok(message)
    }
}

impl Request {
    fn encode(&self, buf: &mut BytesMut) -> ProtocolResult<()> {
        buf.put_u8(self.kind().discriminant());
        match self {
            Self::Handshake(request) => {
                put_str16(buf, &request.username)?;
                put_str16(buf, &request.password)?;
            }
            Self::Get(request) => {
                put_str16(buf, &request.region)?;
                request.key.encode(buf)?;
            }
            Self::Put(request) => {
                put_str16(buf, &request.region)?;
                request.key.encode(buf)?;
                request.value.encode(buf)?;
            }
            Self::Remove(request) => {
                put_str16(buf, &request.region)?;
                request.key.encode(buf)?;
            }
        }
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        let discriminant = take_u8(buf)?;
        let kind = OperationKind::from_discriminant(discriminant)
            .ok_or(ProtocolError::UnknownOperation { discriminant })?;
        match kind {
            OperationKind::Handshake => Ok(Self::Handshake(HandshakeRequest {
                username: take_str16(buf)?,
                password: take_str16(buf)?,
            })),
            OperationKind::Get => Ok(Self::Get(GetRequest {
                region: take_str16(buf)?,
                key: EncodedValue::decode(buf)?,
            })),
            OperationKind::Put => Ok(Self::Put(PutRequest {
                region: take_str16(buf)?,
                key: EncodedValue::decode(buf)?,
                value: EncodedValue::decode(buf)?,
            })),
            OperationKind::Remove => Ok(Self::Remove(RemoveRequest {
                region: take_str16(buf)?,
                key: EncodedValue::decode(buf)?,
            })),
        }
    }
}

impl Response {
    fn tag(&self) -> u8 {
        match self {
            Self::Error(_) => TAG_ERROR,
            Self::Handshake(_) => OperationKind::Handshake.discriminant(),
            Self::Get(_) => OperationKind::Get.discriminant(),
            Self::Put(_) => OperationKind::Put.discriminant(),
            Self::Remove(_) => OperationKind::Remove.discriminant(),
        }
    }

    fn encode(&self, buf: &mut BytesMut) -> ProtocolResult<()> {
        buf.put_u8(self.tag());
        match self {
            Self::Error(response) => {
                buf.put_u16(response.code.as_u16());
                put_str16(buf, &response.message)?;
            }
            Self::Handshake(response) => buf.put_u8(u8::from(response.authenticated)),
            Self::Get(response) => response.value.encode(buf)?,
            Self::Put(PutResponse) => {}
            Self::Remove(response) => buf.put_u8(u8::from(response.removed)),
        }
        Ok(())
    }

    fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        let tag = take_u8(buf)?;
        match tag {
            TAG_ERROR => {
                let raw_code = take_u16(buf)?;
                let code = ErrorCode::from_u16(raw_code).ok_or_else(|| {
                    ProtocolError::malformed(format!("unknown error code {raw_code}"))
                })?;
                Ok(Self::Error(ErrorResponse {
                    code,
                    message: take_str16(buf)?,
                }))
            }
            tag if tag == OperationKind::Handshake.discriminant() => {
                Ok(Self::Handshake(HandshakeResponse {
                    authenticated: take_u8(buf)? != 0,
                }))
            }
            tag if tag == OperationKind::Get.discriminant() => Ok(Self::Get(GetResponse {
                value: EncodedValue::decode(buf)?,
            })),
            tag if tag == OperationKind::Put.discriminant() => Ok(Self::Put(PutResponse)),
            tag if tag == OperationKind::Remove.discriminant() => {
                Ok(Self::Remove(RemoveResponse {
                    removed: take_u8(buf)? != 0,
                }))
            }
            tag => Err(ProtocolError::malformed(format!(
                "unknown response tag 0x{tag:02x}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(message: Message) -> Message {
        let payload = message.encode().unwrap();
        Message::decode(payload).unwrap()
    }

    #[test]
    fn test_get_request_round_trip() {
        let message = Message::Request(Request::Get(GetRequest {
            region: "inventory".to_string(),
            key: EncodedValue::String("widget".to_string()),
        }));
        assert_eq!(round_trip(message.clone()), message);
    }

    #[test]
    fn test_put_request_round_trip() {
        let message = Message::Request(Request::Put(PutRequest {
            region: "inventory".to_string(),
            key: EncodedValue::Int(7),
            value: EncodedValue::Binary(Bytes::from_static(b"\xde\xad")),
        }));
        assert_eq!(round_trip(message.clone()), message);
    }

    #[test]
    fn test_error_response_round_trip() {
        let message = Message::Response(Response::Error(ErrorResponse {
            code: ErrorCode::RegionNotFound,
            message: "region not found: orders".to_string(),
        }));
        assert_eq!(round_trip(message.clone()), message);
    }

    #[test]
    fn test_unknown_operation_discriminant() {
        // Request envelope with discriminant 0x7f.
        let payload = Bytes::from_static(&[0x01, 0x7f]);
        match Message::decode(payload) {
            Err(ProtocolError::UnknownOperation { discriminant: 0x7f }) => {}
            other => panic!("expected UnknownOperation, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_bytes_are_malformed() {
        let mut payload = BytesMut::new();
        let encoded = Message::Request(Request::Handshake(HandshakeRequest {
            username: "admin".to_string(),
            password: "secret".to_string(),
        }))
        .encode()
        .unwrap();
        payload.extend_from_slice(&encoded);
        payload.put_u8(0xff);
        assert!(matches!(
            Message::decode(payload.freeze()),
            Err(ProtocolError::MalformedEnvelope { .. })
        ));
    }

    #[test]
    fn test_wrong_variant_access_fails() {
        let request = Request::Get(GetRequest {
            region: "inventory".to_string(),
            key: EncodedValue::Int(1),
        });
        assert!(matches!(
            request.into_put(),
            Err(ProtocolError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_unsupported_key_encoding_fails_decode() {
        // Get request whose key carries tag 0x2a, outside the defined set.
        let payload = Bytes::from_static(&[
            0x01, 0x02, // request, get
            0x00, 0x01, b'r', // region "r"
            0x2a, // bogus value tag
        ]);
        match Message::decode(payload) {
            Err(ProtocolError::UnsupportedEncoding { tag: 0x2a }) => {}
            other => panic!("expected UnsupportedEncoding, got {:?}", other),
        }
    }
}
