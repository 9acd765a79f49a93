//! Synthetic model entry point.
//!
//! Connects to a running controller and plays one complete coupling
//! session with deterministic data, then exits. Used for end-to-end
//! checks of a controller deployment without the real simulation
//! binary.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ connect_with_retry()  -- TCP connect, bounded retry window
//!  └─ drive_session()       -- handshake, yearly exchange, END_DATA
//!  └─ report summary        -- negotiated channels and rounds
//! ```
//!
//! # Usage
//!
//! ```text
//! coupler-model [controller-address] [years]
//! ```
//!
//! Both arguments are optional: the address defaults to the controller
//! port on localhost and the run length to the scenario default.

use std::time::Duration;

use anyhow::Context;
use coupler_core::DEFAULT_PORT;
use tracing::info;
use tracing_subscriber::EnvFilter;

use coupler_model::application::driver::drive_session;
use coupler_model::application::scenario::Scenario;
use coupler_model::infrastructure::network::connect_with_retry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| format!("127.0.0.1:{DEFAULT_PORT}"));
    let mut scenario = Scenario::default();
    if let Some(years) = std::env::args().nth(2) {
        scenario.years = years
            .parse()
            .with_context(|| format!("invalid year count: {years}"))?;
    }

    info!(%addr, years = scenario.years, "synthetic model starting");

    let mut stream = connect_with_retry(&addr, 30, Duration::from_secs(1))
        .await
        .context("connecting to the controller")?;

    let report = drive_session(&mut stream, &scenario)
        .await
        .context("running the coupling session")?;

    info!(
        negotiated = ?report.negotiated,
        rounds = report.rounds,
        "synthetic model finished"
    );
    Ok(())
}
