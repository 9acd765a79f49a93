//! Connection-setup sequencer.
//!
//! A linear state machine with no way back: greeting, version check,
//! size declaration, input negotiation, output negotiation, static
//! transfer. Any unexpected token at any step is fatal and the session
//! never reaches the streaming loop.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::domain::channels::{Datatype, InputKind, OutputClass, OUTPUT_GRID};
use crate::domain::session::{InputSlot, OutputSlot, Session};
use crate::engine::Forcing;
use crate::protocol::token::{Token, COORDINATE_SCALE, READY_BYTE};
use crate::protocol::wire::{self, CouplerError};

/// Drives the handshake on a freshly accepted stream and returns the
/// populated [`Session`].
///
/// # Errors
///
/// [`CouplerError::VersionMismatch`] if the model declares a version
/// other than `expected_version`; [`CouplerError::UnexpectedToken`] or
/// [`CouplerError::UnexpectedChannel`] on any framing deviation; I/O
/// variants if the stream dies mid-handshake.
pub async fn perform_handshake<S>(
    stream: &mut S,
    forcing: &dyn Forcing,
    expected_version: i32,
) -> Result<Session, CouplerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // ── Greeting ──────────────────────────────────────────────────────────
    wire::write_u8(stream, READY_BYTE).await?;
    let hello = wire::read_i32(stream).await?;
    let expected_count = wire::read_i32(stream).await?;
    wire::write_i32(stream, 1).await?;
    debug!(hello, expected_count, "greeting exchanged");

    // ── Version check ─────────────────────────────────────────────────────
    let declared = wire::read_i32(stream).await?;
    if declared != expected_version {
        return Err(CouplerError::VersionMismatch {
            expected: expected_version,
            declared,
        });
    }
    debug!(version = declared, "protocol version accepted");

    // ── Size declaration ──────────────────────────────────────────────────
    let cell_count = wire::read_i32(stream).await?;
    let input_count = wire::read_i32(stream).await?;
    let output_count = wire::read_i32(stream).await?;
    if cell_count <= 0 {
        return Err(CouplerError::InvalidDeclaration {
            field: "cell count",
            value: cell_count,
        });
    }
    if input_count < 0 {
        return Err(CouplerError::InvalidDeclaration {
            field: "input channel count",
            value: input_count,
        });
    }
    if output_count < 0 {
        return Err(CouplerError::InvalidDeclaration {
            field: "output channel count",
            value: output_count,
        });
    }
    info!(cell_count, input_count, output_count, "model declared run dimensions");

    let mut session = Session::new(cell_count as usize);

    // ── Input negotiation ─────────────────────────────────────────────────
    for _ in 0..input_count {
        wire::expect_token(stream, Token::GetDataSize).await?;
        let index = wire::read_i32(stream).await?;
        let kind = InputKind::try_from(index).ok();
        let bands = kind.and_then(|k| forcing.band_count(k)).unwrap_or(0);
        wire::write_i32(stream, bands).await?;

        match kind {
            Some(k) if bands > 0 => debug!(index, kind = %k, bands, "input channel negotiated"),
            Some(k) => warn!(index, kind = %k, "input channel not offered; answered 0 bands"),
            None => warn!(index, "unknown input channel index; answered 0 bands"),
        }
        session.push_input(InputSlot {
            index,
            kind,
            band_count: bands,
        });
    }

    // ── Output negotiation ────────────────────────────────────────────────
    for _ in 0..output_count {
        wire::expect_token(stream, Token::PutDataSize).await?;
        let index = wire::read_i32(stream).await?;
        let step_count = wire::read_i32(stream).await?;
        let band_count = wire::read_i32(stream).await?;
        let datatype_raw = wire::read_i32(stream).await?;
        let datatype =
            Datatype::try_from(datatype_raw).map_err(|_| CouplerError::UnknownDatatype(datatype_raw))?;
        if band_count < 0 {
            return Err(CouplerError::InvalidDeclaration {
                field: "output band count",
                value: band_count,
            });
        }
        let class = OutputClass::for_index(index);
        debug!(index, step_count, band_count, datatype = ?datatype, class = ?class, "output channel declared");
        session.push_output(OutputSlot::new(index, step_count, band_count, datatype, class));
    }

    // ── Static transfer ───────────────────────────────────────────────────
    for _ in 0..session.static_count() {
        wire::expect_token(stream, Token::PutData).await?;
        let index = wire::read_i32(stream).await?;
        let payload_bytes = session
            .output_by_index(index)
            .filter(|slot| slot.class == OutputClass::Static)
            .map(|slot| slot.static_payload_bytes(session.cell_count()));
        let Some(payload_bytes) = payload_bytes else {
            return Err(CouplerError::UnexpectedChannel {
                index,
                phase: "static transfer",
            });
        };

        if index == OUTPUT_GRID {
            // Coordinates use the fixed 16-bit compressed encoding, not
            // the datatype declared for the channel.
            let mut coordinates = Vec::with_capacity(session.cell_count());
            for _ in 0..session.cell_count() {
                let lon = wire::read_i16_scaled(stream, COORDINATE_SCALE).await?;
                let lat = wire::read_i16_scaled(stream, COORDINATE_SCALE).await?;
                coordinates.push((lon, lat));
            }
            info!(cells = coordinates.len(), "grid coordinates received");
            session.set_grid(coordinates);
        } else {
            wire::drain_exact(stream, payload_bytes).await?;
            info!(index, bytes = payload_bytes, "static channel payload drained");
        }
    }

    info!(
        cells = session.cell_count(),
        inputs = session.input_count(),
        outputs = session.outputs().len(),
        statics = session.static_count(),
        "handshake complete"
    );
    Ok(session)
}
