//! Client side of the coupling protocol.
//!
//! [`drive_session`] plays the model role against a controller on any
//! async stream: it initiates the handshake, negotiates channels,
//! uploads static data, then paces the per-year exchange and finishes
//! with `END_DATA`. The controller only ever reacts, so every await
//! here has a matching controller write and the exchange cannot
//! deadlock.

use coupler_core::protocol::wire;
use coupler_core::{CouplerError, InputKind, OutputClass, Token, OUTPUT_GRID, READY_BYTE};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::application::scenario::{grid_raw, synthetic_value, Scenario};

/// Errors that end a model run.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The controller's greeting byte was not the expected ready marker.
    #[error("controller sent unexpected greeting byte 0x{0:02x}")]
    UnexpectedGreeting(u8),

    /// The underlying exchange failed.
    #[error(transparent)]
    Wire(#[from] CouplerError),
}

/// What the model observed over one complete session.
#[derive(Debug)]
pub struct ModelReport {
    /// `(channel index, granted band count)` per negotiated input.
    pub negotiated: Vec<(i32, i32)>,
    /// Exchange rounds completed before `END_DATA`.
    pub rounds: i32,
    /// Values received for the last input served, if any.
    pub last_input: Vec<f32>,
}

/// Runs one full session in the model role.
///
/// Returns after `END_DATA` has been written, leaving the stream open
/// for the caller to close. Any protocol or transport failure aborts
/// the run with the first error encountered.
pub async fn drive_session<S>(
    stream: &mut S,
    scenario: &Scenario,
) -> Result<ModelReport, ModelError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // ── Greeting and version ──────────────────────────────────────────────────

    let greeting = wire::read_u8(stream).await?;
    if greeting != READY_BYTE {
        return Err(ModelError::UnexpectedGreeting(greeting));
    }
    wire::write_i32(stream, 0).await?;
    wire::write_i32(stream, 1).await?;
    let granted = wire::read_i32(stream).await?;
    debug!(granted, "controller granted protocol count");
    wire::write_i32(stream, scenario.declared_version).await?;

    // ── Size declaration ──────────────────────────────────────────────────────

    wire::write_i32(stream, scenario.cells).await?;
    wire::write_i32(stream, scenario.inputs.len() as i32).await?;
    wire::write_i32(stream, scenario.outputs.len() as i32).await?;
    info!(
        cells = scenario.cells,
        inputs = scenario.inputs.len(),
        outputs = scenario.outputs.len(),
        "declared run sizes"
    );

    // ── Input negotiation ─────────────────────────────────────────────────────

    let mut report = ModelReport {
        negotiated: Vec::with_capacity(scenario.inputs.len()),
        rounds: 0,
        last_input: Vec::new(),
    };
    // Inputs the controller agreed to serve, with the value count each
    // request will transfer.
    let mut active_inputs: Vec<(i32, usize)> = Vec::new();
    for &index in &scenario.inputs {
        wire::write_token(stream, Token::GetDataSize).await?;
        wire::write_i32(stream, index).await?;
        let bands = wire::read_i32(stream).await?;
        report.negotiated.push((index, bands));
        if bands <= 0 {
            warn!(index, "controller does not supply this input");
            continue;
        }
        let value_count = match InputKind::try_from(index) {
            Ok(kind) if kind.is_spatially_uniform() => bands as usize,
            _ => bands as usize * scenario.cells as usize,
        };
        debug!(index, bands, value_count, "input granted");
        active_inputs.push((index, value_count));
    }

    // ── Output negotiation ────────────────────────────────────────────────────

    for spec in &scenario.outputs {
        wire::write_token(stream, Token::PutDataSize).await?;
        wire::write_i32(stream, spec.index).await?;
        wire::write_i32(stream, 1).await?; // steps per year
        wire::write_i32(stream, spec.bands).await?;
        wire::write_i32(stream, spec.datatype as i32).await?;
        debug!(index = spec.index, bands = spec.bands, "output declared");
    }

    // ── Static transfer ───────────────────────────────────────────────────────

    for spec in &scenario.outputs {
        if spec.class() != OutputClass::Static {
            continue;
        }
        wire::write_token(stream, Token::PutData).await?;
        wire::write_i32(stream, spec.index).await?;
        if spec.index == OUTPUT_GRID {
            for cell in 0..scenario.cells {
                let (lon, lat) = grid_raw(cell);
                wire::write_i16(stream, lon).await?;
                wire::write_i16(stream, lat).await?;
            }
        } else {
            let byte_count =
                scenario.cells as usize * spec.bands as usize * spec.datatype.wire_size();
            wire::write_exactly(stream, &vec![0u8; byte_count]).await?;
        }
        debug!(index = spec.index, "static channel sent");
    }

    // An input the controller cannot supply leaves the model without its
    // forcing data, so the run cannot proceed past the handshake.
    if active_inputs.len() != scenario.inputs.len() {
        warn!("one or more inputs unavailable, ending run before the first year");
        wire::write_token(stream, Token::EndData).await?;
        return Ok(report);
    }

    // ── Yearly exchange ───────────────────────────────────────────────────────

    for step in 0..scenario.years {
        let year = scenario.start_year + step;

        for &(index, value_count) in &active_inputs {
            wire::write_token(stream, Token::GetData).await?;
            wire::write_i32(stream, index).await?;
            wire::write_i32(stream, year).await?;
            report.last_input.resize(value_count, 0.0);
            wire::read_f32_into(stream, &mut report.last_input).await?;
        }

        for spec in &scenario.outputs {
            if spec.class() == OutputClass::Static {
                continue;
            }
            wire::write_token(stream, Token::PutData).await?;
            wire::write_i32(stream, spec.index).await?;
            wire::write_i32(stream, year).await?;
            let values = spec_values(spec.index, spec.bands, scenario.cells, step, spec.class());
            wire::write_f32_slice(stream, &values).await?;
        }

        report.rounds += 1;
        debug!(year, "exchange round complete");
    }

    wire::write_token(stream, Token::EndData).await?;
    info!(rounds = report.rounds, "model run complete");
    Ok(report)
}

/// Builds the payload for one output channel at one step.
///
/// Gridded channels are band-major: all cells of band 0, then all cells
/// of band 1, and so on. Global aggregates carry one value per band.
fn spec_values(index: i32, bands: i32, cells: i32, step: i32, class: OutputClass) -> Vec<f32> {
    match class {
        OutputClass::GlobalAggregate => (0..bands)
            .map(|band| synthetic_value(index, band, 0, step))
            .collect(),
        _ => {
            let mut values = Vec::with_capacity(bands as usize * cells as usize);
            for band in 0..bands {
                for cell in 0..cells {
                    values.push(synthetic_value(index, band, cell, step));
                }
            }
            values
        }
    }
}
