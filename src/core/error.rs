//! Error types and wire error-code mapping.
//!
//! Trellis uses one error taxonomy for the whole protocol core. Fatal
//! variants terminate the connection; every other variant is reported to the
//! client as an `ErrorResponse` frame and the connection stays open.

use thiserror::Error;

/// Errors produced by the protocol core.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame header or payload ended before the declared length, or the
    /// declared length desynchronizes the stream. Fatal.
    #[error("framing error: {message}")]
    Framing { message: String },

    /// Transport-level IO failure. Fatal.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload bytes do not parse as a valid envelope.
    #[error("malformed envelope: {message}")]
    MalformedEnvelope { message: String },

    /// Encoded value carries a tag outside the defined set.
    #[error("unsupported encoding tag 0x{tag:02x}")]
    UnsupportedEncoding { tag: u8 },

    /// Request is semantically invalid (empty region, empty key, wrong
    /// envelope variant for the operation).
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Request discriminant has no registered operation.
    #[error("unknown operation 0x{discriminant:02x}")]
    UnknownOperation { discriminant: u8 },

    /// Connection has not completed the handshake.
    #[error("authentication required")]
    AuthenticationRequired,

    /// Handshake credentials were rejected.
    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Authenticated principal lacks the required permission.
    #[error("access denied: {message}")]
    AccessDenied { message: String },

    /// Named region does not exist.
    #[error("region not found: {region}")]
    RegionNotFound { region: String },

    /// Key not present in the region.
    #[error("key not found")]
    NotFound,
}

impl ProtocolError {
    /// Create a Framing error.
    pub fn framing(message: impl Into<String>) -> Self {
        Self::Framing {
            message: message.into(),
        }
    }

    /// Create a MalformedEnvelope error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            message: message.into(),
        }
    }

    /// Create an InvalidRequest error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Whether this error terminates the connection.
    ///
    /// Only transport failures and framing corruption are fatal; everything
    /// else is answered with an `ErrorResponse` frame.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Framing { .. } | Self::Io(_))
    }

    /// Wire error code for this error.
    ///
    /// Fatal errors are never sent to the client; they map to
    /// [`ErrorCode::Internal`] to keep the function total.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Framing { .. } | Self::Io(_) => ErrorCode::Internal,
            Self::MalformedEnvelope { .. } => ErrorCode::MalformedEnvelope,
            Self::UnsupportedEncoding { .. } => ErrorCode::UnsupportedEncoding,
            Self::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            Self::UnknownOperation { .. } => ErrorCode::UnknownOperation,
            Self::AuthenticationRequired => ErrorCode::AuthenticationRequired,
            Self::AuthenticationFailed { .. } => ErrorCode::AuthenticationFailed,
            Self::AccessDenied { .. } => ErrorCode::AccessDenied,
            Self::RegionNotFound { .. } => ErrorCode::RegionNotFound,
            Self::NotFound => ErrorCode::NotFound,
        }
    }
}

/// Result type using ProtocolError.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Numeric error codes carried by `ErrorResponse` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    InvalidRequest = 1,
    UnsupportedEncoding = 2,
    UnknownOperation = 3,
    MalformedEnvelope = 4,
    AuthenticationRequired = 10,
    AuthenticationFailed = 11,
    AccessDenied = 12,
    RegionNotFound = 20,
    NotFound = 21,
    Internal = 100,
}

impl ErrorCode {
    /// Wire representation of the code.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Parse a wire error code.
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::InvalidRequest),
            2 => Some(Self::UnsupportedEncoding),
            3 => Some(Self::UnknownOperation),
            4 => Some(Self::MalformedEnvelope),
            10 => Some(Self::AuthenticationRequired),
            11 => Some(Self::AuthenticationFailed),
            12 => Some(Self::AccessDenied),
            20 => Some(Self::RegionNotFound),
            21 => Some(Self::NotFound),
            100 => Some(Self::Internal),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_split() {
        assert!(ProtocolError::framing("truncated").is_fatal());
        assert!(ProtocolError::Io(std::io::Error::other("boom")).is_fatal());
        assert!(!ProtocolError::malformed("bad payload").is_fatal());
        assert!(!ProtocolError::NotFound.is_fatal());
        assert!(!ProtocolError::AuthenticationRequired.is_fatal());
    }

    #[test]
    fn test_error_code_round_trip() {
        for code in [
            ErrorCode::InvalidRequest,
            ErrorCode::UnsupportedEncoding,
            ErrorCode::UnknownOperation,
            ErrorCode::MalformedEnvelope,
            ErrorCode::AuthenticationRequired,
            ErrorCode::AuthenticationFailed,
            ErrorCode::AccessDenied,
            ErrorCode::RegionNotFound,
            ErrorCode::NotFound,
            ErrorCode::Internal,
        ] {
            assert_eq!(ErrorCode::from_u16(code.as_u16()), Some(code));
        }
        assert_eq!(ErrorCode::from_u16(9999), None);
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(ProtocolError::NotFound.error_code(), ErrorCode::NotFound);
        assert_eq!(
            ProtocolError::RegionNotFound {
                region: "orders".to_string()
            }
            .error_code(),
            ErrorCode::RegionNotFound
        );
        assert_eq!(
            ProtocolError::UnknownOperation { discriminant: 0x7f }.error_code(),
            ErrorCode::UnknownOperation
        );
    }
}
