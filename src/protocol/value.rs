//! Encoded value union and the typed value decoder.
//!
//! Cache keys and values travel as a byte-tagged union over ten encodings.
//! [`EncodedValue`] is the wire form; [`Value`] is the decoded host value.
//! The tag and the payload variant always agree by construction: decoding
//! dispatches on the tag, and an unrecognized tag fails with
//! `UnsupportedEncoding` rather than falling back to any default.

use crate::core::error::{ProtocolError, ProtocolResult};
use crate::protocol::{put_bin32, put_str32, take_bin32, take_str32, take_u16, take_u32, take_u64, take_u8};
use bytes::{BufMut, Bytes, BytesMut};
use std::hash::{Hash, Hasher};

pub(crate) const TAG_BOOLEAN: u8 = 0x01;
pub(crate) const TAG_BYTE: u8 = 0x02;
pub(crate) const TAG_SHORT: u8 = 0x03;
pub(crate) const TAG_INT: u8 = 0x04;
pub(crate) const TAG_LONG: u8 = 0x05;
pub(crate) const TAG_FLOAT: u8 = 0x06;
pub(crate) const TAG_DOUBLE: u8 = 0x07;
pub(crate) const TAG_STRING: u8 = 0x08;
pub(crate) const TAG_BINARY: u8 = 0x09;
pub(crate) const TAG_CUSTOM: u8 = 0x0a;

/// Wire-level encoded value union.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedValue {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Binary(Bytes),
    /// Application-defined encoding, opaque to the protocol core.
    Custom { format: u16, data: Bytes },
}

impl EncodedValue {
    /// Wire tag for this variant.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Boolean(_) => TAG_BOOLEAN,
            Self::Byte(_) => TAG_BYTE,
            Self::Short(_) => TAG_SHORT,
            Self::Int(_) => TAG_INT,
            Self::Long(_) => TAG_LONG,
            Self::Float(_) => TAG_FLOAT,
            Self::Double(_) => TAG_DOUBLE,
            Self::String(_) => TAG_STRING,
            Self::Binary(_) => TAG_BINARY,
            Self::Custom { .. } => TAG_CUSTOM,
        }
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) -> ProtocolResult<()> {
        buf.put_u8(self.tag());
        match self {
            Self::Boolean(v) => buf.put_u8(u8::from(*v)),
            Self::Byte(v) => buf.put_i8(*v),
            Self::Short(v) => buf.put_i16(*v),
            Self::Int(v) => buf.put_i32(*v),
            Self::Long(v) => buf.put_i64(*v),
            Self::Float(v) => buf.put_u32(v.to_bits()),
            Self::Double(v) => buf.put_u64(v.to_bits()),
            Self::String(v) => put_str32(buf, v)?,
            Self::Binary(v) => put_bin32(buf, v)?,
            Self::Custom { format, data } => {
                buf.put_u16(*format);
                put_bin32(buf, data)?;
            }
        }
        Ok(())
    }

    pub(crate) fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        let tag = take_u8(buf)?;
        match tag {
            TAG_BOOLEAN => Ok(Self::Boolean(take_u8(buf)? != 0)),
            TAG_BYTE => Ok(Self::Byte(take_u8(buf)? as i8)),
            TAG_SHORT => Ok(Self::Short(take_u16(buf)? as i16)),
            TAG_INT => Ok(Self::Int(take_u32(buf)? as i32)),
            TAG_LONG => Ok(Self::Long(take_u64(buf)? as i64)),
            TAG_FLOAT => Ok(Self::Float(f32::from_bits(take_u32(buf)?))),
            TAG_DOUBLE => Ok(Self::Double(f64::from_bits(take_u64(buf)?))),
            TAG_STRING => Ok(Self::String(take_str32(buf)?)),
            TAG_BINARY => Ok(Self::Binary(take_bin32(buf)?)),
            TAG_CUSTOM => {
                let format = take_u16(buf)?;
                let data = take_bin32(buf)?;
                Ok(Self::Custom { format, data })
            }
            tag => Err(ProtocolError::UnsupportedEncoding { tag }),
        }
    }
}

/// Decoded host value.
///
/// `Value` implements `Eq` and `Hash` (floats compared and hashed by bit
/// pattern) so it can key a region map.
#[derive(Debug, Clone)]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Binary(Bytes),
    Custom { format: u16, data: Bytes },
}

impl Value {
    /// Whether this value is unusable as a key.
    ///
    /// Empty strings and empty byte sequences are rejected before the cache
    /// is consulted; scalar values are never empty.
    pub fn is_empty_key(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::Binary(b) => b.is_empty(),
            Self::Custom { data, .. } => data.is_empty(),
            _ => false,
        }
    }
}

impl From<EncodedValue> for Value {
    fn from(encoded: EncodedValue) -> Self {
        match encoded {
            EncodedValue::Boolean(v) => Self::Boolean(v),
            EncodedValue::Byte(v) => Self::Byte(v),
            EncodedValue::Short(v) => Self::Short(v),
            EncodedValue::Int(v) => Self::Int(v),
            EncodedValue::Long(v) => Self::Long(v),
            EncodedValue::Float(v) => Self::Float(v),
            EncodedValue::Double(v) => Self::Double(v),
            EncodedValue::String(v) => Self::String(v),
            EncodedValue::Binary(v) => Self::Binary(v),
            EncodedValue::Custom { format, data } => Self::Custom { format, data },
        }
    }
}

impl From<Value> for EncodedValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Boolean(v) => Self::Boolean(v),
            Value::Byte(v) => Self::Byte(v),
            Value::Short(v) => Self::Short(v),
            Value::Int(v) => Self::Int(v),
            Value::Long(v) => Self::Long(v),
            Value::Float(v) => Self::Float(v),
            Value::Double(v) => Self::Double(v),
            Value::String(v) => Self::String(v),
            Value::Binary(v) => Self::Binary(v),
            Value::Custom { format, data } => Self::Custom { format, data },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Binary(a), Self::Binary(b)) => a == b,
            (
                Self::Custom { format: fa, data: da },
                Self::Custom { format: fb, data: db },
            ) => fa == fb && da == db,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Boolean(v) => {
                state.write_u8(TAG_BOOLEAN);
                v.hash(state);
            }
            Self::Byte(v) => {
                state.write_u8(TAG_BYTE);
                v.hash(state);
            }
            Self::Short(v) => {
                state.write_u8(TAG_SHORT);
                v.hash(state);
            }
            Self::Int(v) => {
                state.write_u8(TAG_INT);
                v.hash(state);
            }
            Self::Long(v) => {
                state.write_u8(TAG_LONG);
                v.hash(state);
            }
            Self::Float(v) => {
                state.write_u8(TAG_FLOAT);
                v.to_bits().hash(state);
            }
            Self::Double(v) => {
                state.write_u8(TAG_DOUBLE);
                v.to_bits().hash(state);
            }
            Self::String(v) => {
                state.write_u8(TAG_STRING);
                v.hash(state);
            }
            Self::Binary(v) => {
                state.write_u8(TAG_BINARY);
                v.hash(state);
            }
            Self::Custom { format, data } => {
                state.write_u8(TAG_CUSTOM);
                format.hash(state);
                data.hash(state);
            }
        }
    }
}
