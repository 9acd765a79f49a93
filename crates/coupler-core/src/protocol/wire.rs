//! Byte-level wire primitives for the coupling stream.
//!
//! All multi-byte values are little-endian, matching the simulation
//! binary's native representation on the deployment hosts. Reads are
//! exact: a value is either read in full or the session fails; a short
//! read is never surfaced to a caller as a partial value.

use std::io;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::token::Token;

/// Errors that terminate a coupling session.
///
/// None of these are retried: the protocol has no notion of resuming
/// mid-stream, so every variant tears the session down.
#[derive(Debug, Error)]
pub enum CouplerError {
    /// The peer closed the stream in the middle of an exchange.
    #[error("connection closed by peer mid-exchange")]
    ConnectionClosed,

    /// The transport failed outright.
    #[error("stream I/O failed")]
    Io(#[source] io::Error),

    /// The model declared a protocol version this engine does not speak.
    #[error("protocol version mismatch: expected {expected}, model declared {declared}")]
    VersionMismatch { expected: i32, declared: i32 },

    /// A known token arrived in a phase that requires a different one.
    #[error("protocol violation: expected {expected}, received {received}")]
    UnexpectedToken { expected: Token, received: Token },

    /// A value arrived where a token was required but is no token at all.
    #[error("unknown token on the wire: {0}")]
    UnknownToken(i32),

    /// The model referenced a channel the session cannot serve in that phase.
    #[error("channel index {index} not valid during {phase}")]
    UnexpectedChannel { index: i32, phase: &'static str },

    /// An output channel declared a datatype tag outside the known table.
    #[error("unknown datatype tag: {0}")]
    UnknownDatatype(i32),

    /// A declared size makes no sense (negative count, non-positive cells).
    #[error("invalid {field} declared by the model: {value}")]
    InvalidDeclaration { field: &'static str, value: i32 },

    /// The forcing source failed to produce values for an input channel.
    #[error("forcing source failed for channel {index}: {reason}")]
    Forcing { index: i32, reason: String },
}

/// Maps transport errors, treating an EOF or reset mid-value as the peer
/// closing the stream rather than a local I/O fault.
fn closed_or_io(err: io::Error) -> CouplerError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionReset => CouplerError::ConnectionClosed,
        _ => CouplerError::Io(err),
    }
}

// ── Exact read/write base operations ──────────────────────────────────────────

/// Fills `buf` completely or fails; never returns with a partial buffer.
pub async fn read_exactly<R>(stream: &mut R, buf: &mut [u8]) -> Result<(), CouplerError>
where
    R: AsyncRead + Unpin,
{
    stream.read_exact(buf).await.map_err(closed_or_io)?;
    Ok(())
}

/// Writes all of `bytes` or fails.
pub async fn write_exactly<W>(stream: &mut W, bytes: &[u8]) -> Result<(), CouplerError>
where
    W: AsyncWrite + Unpin,
{
    stream.write_all(bytes).await.map_err(closed_or_io)
}

// ── Typed primitives ──────────────────────────────────────────────────────────

/// Reads one 4-byte signed integer.
pub async fn read_i32<R>(stream: &mut R) -> Result<i32, CouplerError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 4];
    read_exactly(stream, &mut buf).await?;
    Ok(i32::from_le_bytes(buf))
}

/// Writes one 4-byte signed integer.
pub async fn write_i32<W>(stream: &mut W, value: i32) -> Result<(), CouplerError>
where
    W: AsyncWrite + Unpin,
{
    write_exactly(stream, &value.to_le_bytes()).await
}

/// Reads one 2-byte signed integer and applies a fixed-point `scale`.
///
/// Used for the compressed coordinate encoding, where a raw value of
/// 1234 with scale 0.01 decodes to 12.34.
pub async fn read_i16_scaled<R>(stream: &mut R, scale: f32) -> Result<f32, CouplerError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 2];
    read_exactly(stream, &mut buf).await?;
    Ok(f32::from(i16::from_le_bytes(buf)) * scale)
}

/// Writes one 2-byte signed integer (the raw, unscaled value).
pub async fn write_i16<W>(stream: &mut W, value: i16) -> Result<(), CouplerError>
where
    W: AsyncWrite + Unpin,
{
    write_exactly(stream, &value.to_le_bytes()).await
}

/// Reads one 4-byte IEEE 754 float.
pub async fn read_f32<R>(stream: &mut R) -> Result<f32, CouplerError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 4];
    read_exactly(stream, &mut buf).await?;
    Ok(f32::from_le_bytes(buf))
}

/// Writes one 4-byte IEEE 754 float.
pub async fn write_f32<W>(stream: &mut W, value: f32) -> Result<(), CouplerError>
where
    W: AsyncWrite + Unpin,
{
    write_exactly(stream, &value.to_le_bytes()).await
}

/// Reads one byte.
pub async fn read_u8<R>(stream: &mut R) -> Result<u8, CouplerError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 1];
    read_exactly(stream, &mut buf).await?;
    Ok(buf[0])
}

/// Writes one byte.
pub async fn write_u8<W>(stream: &mut W, value: u8) -> Result<(), CouplerError>
where
    W: AsyncWrite + Unpin,
{
    write_exactly(stream, &[value]).await
}

// ── Bulk float payloads ───────────────────────────────────────────────────────

/// Fills `values` from the stream, in wire order.
///
/// The whole payload is pulled in one exact read so a truncated stream
/// surfaces as [`CouplerError::ConnectionClosed`] before any value is
/// visible to the caller.
pub async fn read_f32_into<R>(stream: &mut R, values: &mut [f32]) -> Result<(), CouplerError>
where
    R: AsyncRead + Unpin,
{
    let mut raw = vec![0u8; values.len() * 4];
    read_exactly(stream, &mut raw).await?;
    for (chunk, value) in raw.chunks_exact(4).zip(values.iter_mut()) {
        *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(())
}

/// Writes `values` to the stream, in order, as one contiguous payload.
pub async fn write_f32_slice<W>(stream: &mut W, values: &[f32]) -> Result<(), CouplerError>
where
    W: AsyncWrite + Unpin,
{
    let mut raw = Vec::with_capacity(values.len() * 4);
    for value in values {
        raw.extend_from_slice(&value.to_le_bytes());
    }
    write_exactly(stream, &raw).await
}

/// Consumes and discards exactly `byte_count` bytes.
///
/// Used for static payloads whose shape is negotiated but whose content
/// the engine does not interpret; skipping them keeps the stream in sync.
pub async fn drain_exact<R>(stream: &mut R, byte_count: usize) -> Result<(), CouplerError>
where
    R: AsyncRead + Unpin,
{
    let mut scratch = [0u8; 8192];
    let mut remaining = byte_count;
    while remaining > 0 {
        let take = remaining.min(scratch.len());
        read_exactly(stream, &mut scratch[..take]).await?;
        remaining -= take;
    }
    Ok(())
}

// ── Token framing ─────────────────────────────────────────────────────────────

/// Reads the next token, rejecting values outside the token table.
pub async fn read_token<R>(stream: &mut R) -> Result<Token, CouplerError>
where
    R: AsyncRead + Unpin,
{
    let raw = read_i32(stream).await?;
    Token::try_from(raw).map_err(|_| CouplerError::UnknownToken(raw))
}

/// Reads the next token and requires it to be `expected`.
pub async fn expect_token<R>(stream: &mut R, expected: Token) -> Result<(), CouplerError>
where
    R: AsyncRead + Unpin,
{
    let received = read_token(stream).await?;
    if received != expected {
        return Err(CouplerError::UnexpectedToken { expected, received });
    }
    Ok(())
}

/// Writes one token.
pub async fn write_token<W>(stream: &mut W, token: Token) -> Result<(), CouplerError>
where
    W: AsyncWrite + Unpin,
{
    write_i32(stream, token as i32).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
