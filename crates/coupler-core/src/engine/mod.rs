//! Session engine: handshake sequencing and the steady-state streaming
//! loop.
//!
//! The engine is generic over the stream so the same code runs on an
//! accepted TCP connection in production and on an in-memory duplex
//! pipe in tests. It is strictly sequential: one task owns the stream
//! and the [`Session`] from accept to termination, and every read or
//! write suspends that task until the model produces or consumes bytes.

mod handshake;
mod streaming;

pub use handshake::perform_handshake;
pub use streaming::{run_streaming, SessionSummary};

use tokio::io::{AsyncRead, AsyncWrite};

use crate::domain::channels::InputKind;
use crate::domain::session::Session;
use crate::protocol::wire::CouplerError;

/// Source of the input values the controller supplies to the model.
///
/// Implementations are plain lookups or table fills; the engine owns
/// all awaiting, so `fill` must not block.
pub trait Forcing: Send + Sync {
    /// Bands this source can supply for `kind`, or `None` when the
    /// channel is not available for this run. Drives the band-count
    /// answer during input negotiation.
    fn band_count(&self, kind: InputKind) -> Option<i32>;

    /// Fills `values` for one channel and step. The slice is sized by
    /// the negotiated shape: `bands × cells`, or `bands` for spatially
    /// uniform channels.
    fn fill(&mut self, kind: InputKind, year: i32, values: &mut [f32]) -> Result<(), String>;
}

/// Runs one complete session on an accepted stream: handshake, then the
/// per-timestep loop until the model signals the end of data.
///
/// # Errors
///
/// Returns the first [`CouplerError`] encountered. Nothing is retried;
/// the caller should close the connection and exit non-zero.
pub async fn run_session<S>(
    stream: &mut S,
    forcing: &mut dyn Forcing,
    expected_version: i32,
) -> Result<SessionSummary, CouplerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let session = perform_handshake(stream, &*forcing, expected_version).await?;
    run_streaming(stream, session, forcing).await
}
