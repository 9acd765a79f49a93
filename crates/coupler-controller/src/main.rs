//! Coupler controller entry point.
//!
//! Wires configuration, the TCP listener, and the session engine
//! together and drives exactly one model session from accept to
//! `END_DATA`.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- TOML settings (optional file)
//!  └─ load_run_config()      -- JSON run description (optional)
//!  └─ ModelListener::bind()  -- TCP listener, single accept
//!  └─ RunSessionUseCase      -- handshake + yearly exchange loop
//! ```

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use coupler_controller::application::forcing::ConstantForcing;
use coupler_controller::application::run_session::RunSessionUseCase;
use coupler_controller::infrastructure::network::ModelListener;
use coupler_controller::infrastructure::storage::{config, run_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("coupler controller starting");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(config::default_config_path);
    let cfg = config::load_config(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    let mut forcing = ConstantForcing::new();
    forcing.apply_overrides(&cfg.forcing);

    let mut expected_cells = None;
    if let Some(path) = &cfg.session.run_config {
        let run = run_config::load_run_config(path)
            .with_context(|| format!("loading run configuration from {}", path.display()))?;
        if let Some(inputs) = &run.inputs {
            forcing.restrict(inputs);
        }
        expected_cells = run.cells;
        info!(path = %path.display(), "run configuration applied");
    }

    let listener = ModelListener::bind(&cfg.network.bind_address, cfg.network.port)
        .await
        .context("binding the listener")?;

    let use_case = RunSessionUseCase::new(forcing, cfg.session.protocol_version)
        .with_expected_cells(expected_cells);

    let session = async {
        let (mut stream, _peer) = listener
            .accept_model()
            .await
            .context("accepting the model connection")?;
        use_case
            .run(&mut stream)
            .await
            .context("running the session")
    };

    // The model may run for hours; Ctrl-C aborts the wait or the session.
    tokio::select! {
        result = session => {
            let summary = result?;
            info!(
                rounds = summary.rounds,
                last_year = ?summary.last_year,
                "session finished"
            );
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    info!("coupler controller stopped");
    Ok(())
}
