//! Annual exchange loop.
//!
//! After the handshake the model drives a strict cadence: one request
//! per negotiated input channel, then one delivery per non-static
//! output channel, repeated once per simulation year. The model ends
//! the run by sending `END_DATA` where the next input request would
//! start; the token arrives bare and the final round has no output
//! phase.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, trace};

use crate::domain::channels::OutputClass;
use crate::domain::session::Session;
use crate::engine::Forcing;
use crate::protocol::token::Token;
use crate::protocol::wire::{self, CouplerError};

/// Totals accumulated over the streaming phase, returned once the model
/// signals `END_DATA`.
#[derive(Debug)]
pub struct SessionSummary {
    /// Completed exchange rounds. The round cut short by `END_DATA`
    /// does not count.
    pub rounds: u64,
    /// Most recent simulation year announced by the model.
    pub last_year: Option<i32>,
    /// Final session state, including the last delivered output values.
    pub session: Session,
}

/// Runs the per-year exchange until the model signals `END_DATA`.
///
/// # Errors
///
/// Any token outside the expected cadence, a request for a channel that
/// was not negotiated, a [`Forcing`] failure, or a dropped connection
/// all abort the session.
pub async fn run_streaming<S>(
    stream: &mut S,
    mut session: Session,
    forcing: &mut dyn Forcing,
) -> Result<SessionSummary, CouplerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let input_count = session.input_count();
    let active_output_count = session.active_output_count();

    // With no channels in either direction there is no read to block
    // on and no way to receive END_DATA.
    if input_count == 0 && active_output_count == 0 {
        info!("no channels negotiated; nothing to stream");
        return Ok(SessionSummary {
            rounds: 0,
            last_year: None,
            session,
        });
    }

    let mut rounds: u64 = 0;
    let mut last_year: Option<i32> = None;
    let mut scratch: Vec<f32> = Vec::new();

    'rounds: loop {
        // ── Input phase ───────────────────────────────────────────────────
        for _ in 0..input_count {
            match wire::read_token(stream).await? {
                Token::EndData => {
                    info!(rounds, "model signalled end of run");
                    break 'rounds;
                }
                Token::GetData => {}
                received => {
                    return Err(CouplerError::UnexpectedToken {
                        expected: Token::GetData,
                        received,
                    });
                }
            }
            let index = wire::read_i32(stream).await?;
            let year = wire::read_i32(stream).await?;
            let Some((kind, value_count)) = session.supplyable_input(index) else {
                return Err(CouplerError::UnexpectedChannel {
                    index,
                    phase: "input exchange",
                });
            };
            scratch.resize(value_count, 0.0);
            forcing
                .fill(kind, year, &mut scratch)
                .map_err(|reason| CouplerError::Forcing { index, reason })?;
            wire::write_f32_slice(stream, &scratch).await?;
            trace!(index, kind = %kind, year, values = value_count, "input channel served");
            last_year = Some(year);
        }

        // ── Output phase ──────────────────────────────────────────────────
        for _ in 0..active_output_count {
            wire::expect_token(stream, Token::PutData).await?;
            let index = wire::read_i32(stream).await?;
            let year = wire::read_i32(stream).await?;
            let Some(slot) = session
                .output_by_index_mut(index)
                .filter(|slot| slot.class != OutputClass::Static)
            else {
                return Err(CouplerError::UnexpectedChannel {
                    index,
                    phase: "output exchange",
                });
            };
            wire::read_f32_into(stream, &mut slot.values).await?;
            if slot.class == OutputClass::GlobalAggregate {
                info!(index, year, flux = ?slot.values, "global aggregate received");
            } else {
                trace!(index, year, values = slot.values.len(), "output channel received");
            }
        }

        rounds += 1;
        debug!(round = rounds, year = ?last_year, "exchange round complete");
    }

    Ok(SessionSummary {
        rounds,
        last_year,
        session,
    })
}
