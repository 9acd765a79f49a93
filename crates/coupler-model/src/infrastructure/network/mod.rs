//! Network infrastructure for the model application.
//!
//! The model is the connecting side: the controller must already be
//! listening when the model starts, but in batch environments the two
//! are often launched together, so the connect path retries for a
//! bounded window before giving up.

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time;
use tracing::{debug, info};

/// Errors from the model's connect path.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Every connection attempt failed within the retry window.
    #[error("could not reach controller at {addr} after {attempts} attempts")]
    Exhausted {
        addr: String,
        attempts: u32,
        #[source]
        source: io::Error,
    },
}

/// Connects to the controller, retrying up to `attempts` times with
/// `interval` between tries.
///
/// Returns the connected stream on the first success. The last
/// connection error is carried in [`ConnectError::Exhausted`] when the
/// window runs out.
pub async fn connect_with_retry(
    addr: &str,
    attempts: u32,
    interval: Duration,
) -> Result<TcpStream, ConnectError> {
    let mut last_err: Option<io::Error> = None;
    for attempt in 1..=attempts {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                info!(addr, attempt, "connected to controller");
                return Ok(stream);
            }
            Err(err) => {
                debug!(addr, attempt, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
        if attempt < attempts {
            time::sleep(interval).await;
        }
    }
    Err(ConnectError::Exhausted {
        addr: addr.to_string(),
        attempts,
        source: last_err
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "no attempts made")),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
