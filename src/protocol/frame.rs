//! Length-prefixed message framing.
//!
//! A frame is a 4-byte big-endian unsigned length followed by exactly that
//! many payload bytes. Reads distinguish a clean close (EOF on a frame
//! boundary) from a truncated frame (EOF inside a frame, fatal). Writes
//! buffer the whole frame before touching the stream so a response is never
//! partially written from the protocol's perspective.

use crate::core::error::{ProtocolError, ProtocolResult};
use crate::protocol::message::Message;
use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum envelope payload size. A declared length beyond this bound is
/// treated as framing corruption: the stream cannot be resynchronized.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Read one framed message.
///
/// Returns `Ok(None)` when the stream closes cleanly on a frame boundary.
/// EOF anywhere inside a frame is a [`ProtocolError::Framing`] error; payload
/// parse failures are reportable and leave the stream positioned at the next
/// frame.
pub async fn read_message<R>(reader: &mut R) -> ProtocolResult<Option<Message>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    let first = reader.read(&mut header[..1]).await?;
    if first == 0 {
        return Ok(None);
    }
    reader
        .read_exact(&mut header[1..])
        .await
        .map_err(map_eof("frame header ended early"))?;

    let len = u32::from_be_bytes(header) as usize;
    if len == 0 {
        // The stream stays synchronized; report and keep the connection.
        return Err(ProtocolError::malformed("zero-length envelope"));
    }
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::framing(format!(
            "declared frame length {len} exceeds maximum {MAX_MESSAGE_SIZE}"
        )));
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(map_eof("frame payload ended early"))?;

    Message::decode(payload.into()).map(Some)
}

/// Write one framed message.
pub async fn write_message<W>(writer: &mut W, message: &Message) -> ProtocolResult<()>
where
    W: AsyncWrite + Unpin,
{
    let payload = message.encode()?;
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::framing(format!(
            "outgoing frame length {} exceeds maximum {MAX_MESSAGE_SIZE}",
            payload.len()
        )));
    }
    let mut frame = BytesMut::with_capacity(4 + payload.len());
    frame.put_u32(payload.len() as u32);
    frame.extend_from_slice(&payload);
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

fn map_eof(message: &'static str) -> impl Fn(std::io::Error) -> ProtocolError {
    move |error| {
        if error.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::framing(message)
        } else {
            ProtocolError::Io(error)
        }
    }
}
