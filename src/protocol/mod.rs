//! Wire protocol: framing, envelope tagged unions, and value encoding.
//!
//! The client protocol is a length-framed binary exchange. Every frame is a
//! 4-byte big-endian length followed by one envelope payload:
//!
//! ```text
//! ┌────────────────┬──────────────────────────────────────────────┐
//! │ len: u32 (BE)  │ payload: len bytes                           │
//! └────────────────┴──────────────────────────────────────────────┘
//!
//! payload := [kind: u8] body
//!   0x01 Request  := [op: u8] request body
//!   0x02 Response := [tag: u8] response body
//! ```
//!
//! [`frame`] reads and writes whole frames, [`message`] parses and builds the
//! envelope unions, and [`value`] handles the polymorphic encoded-value union
//! used for cache keys and values.

pub mod frame;
pub mod message;
pub mod value;

use crate::core::error::{ProtocolError, ProtocolResult};
use bytes::{Buf, BufMut, Bytes, BytesMut};

// Checked read helpers shared by the envelope and value decoders. All reads
// are big-endian; running out of bytes is a malformed envelope, not a panic.

pub(crate) fn take_u8(buf: &mut Bytes) -> ProtocolResult<u8> {
    if buf.remaining() < 1 {
        return Err(ProtocolError::malformed("payload ended early"));
    }
    Ok(buf.get_u8())
}

pub(crate) fn take_u16(buf: &mut Bytes) -> ProtocolResult<u16> {
    if buf.remaining() < 2 {
        return Err(ProtocolError::malformed("payload ended early"));
    }
    Ok(buf.get_u16())
}

pub(crate) fn take_u32(buf: &mut Bytes) -> ProtocolResult<u32> {
    if buf.remaining() < 4 {
        return Err(ProtocolError::malformed("payload ended early"));
    }
    Ok(buf.get_u32())
}

pub(crate) fn take_u64(buf: &mut Bytes) -> ProtocolResult<u64> {
    if buf.remaining() < 8 {
        return Err(ProtocolError::malformed("payload ended early"));
    }
    Ok(buf.get_u64())
}

pub(crate) fn take_bytes(buf: &mut Bytes, len: usize) -> ProtocolResult<Bytes> {
    if buf.remaining() < len {
        return Err(ProtocolError::malformed("payload ended early"));
    }
    Ok(buf.split_to(len))
}

/// Read a u16-length-prefixed UTF-8 string.
pub(crate) fn take_str16(buf: &mut Bytes) -> ProtocolResult<String> {
    let len = take_u16(buf)? as usize;
    let raw = take_bytes(buf, len)?;
    String::from_utf8(raw.to_vec()).map_err(|_| ProtocolError::malformed("invalid utf-8 string"))
}

/// Read a u32-length-prefixed UTF-8 string.
pub(crate) fn take_str32(buf: &mut Bytes) -> ProtocolResult<String> {
    let len = take_u32(buf)? as usize;
    let raw = take_bytes(buf, len)?;
    String::from_utf8(raw.to_vec()).map_err(|_| ProtocolError::malformed("invalid utf-8 string"))
}

/// Read a u32-length-prefixed byte sequence.
pub(crate) fn take_bin32(buf: &mut Bytes) -> ProtocolResult<Bytes> {
    let len = take_u32(buf)? as usize;
    take_bytes(buf, len)
}

/// Write a u16-length-prefixed UTF-8 string.
pub(crate) fn put_str16(buf: &mut BytesMut, value: &str) -> ProtocolResult<()> {
    let len = u16::try_from(value.len())
        .map_err(|_| ProtocolError::invalid("string field exceeds 65535 bytes"))?;
    buf.put_u16(len);
    buf.put_slice(value.as_bytes());
    Ok(())
}

/// Write a u32-length-prefixed UTF-8 string.
pub(crate) fn put_str32(buf: &mut BytesMut, value: &str) -> ProtocolResult<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| ProtocolError::invalid("string field exceeds u32 length"))?;
    buf.put_u32(len);
    buf.put_slice(value.as_bytes());
    Ok(())
}

/// Write a u32-length-prefixed byte sequence.
pub(crate) fn put_bin32(buf: &mut BytesMut, value: &[u8]) -> ProtocolResult<()> {
    let len = u32::try_from(value.len())
        .map_err(|_| ProtocolError::invalid("binary field exceeds u32 length"))?;
    buf.put_u32(len);
    buf.put_slice(value);
    Ok(())
}
