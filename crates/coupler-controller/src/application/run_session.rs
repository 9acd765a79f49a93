//! RunSessionUseCase: one accepted connection driven to completion.
//!
//! Thin orchestration over the engine: run the handshake, apply the
//! run-configuration cross-check, then hand the stream to the streaming
//! loop and report the outcome. Generic over the stream so integration
//! tests can drive it over an in-memory duplex pipe.

use coupler_core::{perform_handshake, run_streaming, CouplerError, SessionSummary};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

use crate::application::forcing::ConstantForcing;

/// Drives one model connection from greeting to `END_DATA`.
pub struct RunSessionUseCase {
    forcing: ConstantForcing,
    expected_version: i32,
    /// Cell count announced by the run configuration, if any. A
    /// mismatch with the model's declaration is logged, not fatal; the
    /// model's declaration governs.
    expected_cells: Option<i32>,
}

impl RunSessionUseCase {
    pub fn new(forcing: ConstantForcing, expected_version: i32) -> Self {
        Self {
            forcing,
            expected_version,
            expected_cells: None,
        }
    }

    pub fn with_expected_cells(mut self, cells: Option<i32>) -> Self {
        self.expected_cells = cells;
        self
    }

    /// Runs the session to completion and returns the summary.
    ///
    /// # Errors
    ///
    /// Propagates the first [`CouplerError`]; the connection is useless
    /// afterwards and the caller should exit non-zero.
    pub async fn run<S>(mut self, stream: &mut S) -> Result<SessionSummary, CouplerError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let session = perform_handshake(stream, &self.forcing, self.expected_version).await?;

        if let Some(expected) = self.expected_cells {
            if expected as usize != session.cell_count() {
                warn!(
                    declared = session.cell_count(),
                    expected, "model cell count differs from run configuration"
                );
            }
        }

        let summary = run_streaming(stream, session, &mut self.forcing).await?;

        if let Some(flux) = summary.session.flux() {
            info!(?flux, rounds = summary.rounds, "final global flux");
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use coupler_core::protocol::wire;
    use coupler_core::{CouplerError, PROTOCOL_VERSION, READY_BYTE};

    use super::*;

    /// Plays the model side of the greeting and size declaration.
    async fn declare_run(
        model: &mut tokio::io::DuplexStream,
        version: i32,
        cells: i32,
        inputs: i32,
        outputs: i32,
    ) {
        let ready = wire::read_u8(model).await.expect("greeting byte");
        assert_eq!(ready, READY_BYTE);
        wire::write_i32(model, 0).await.expect("hello");
        wire::write_i32(model, 1).await.expect("expected protocol count");
        let granted = wire::read_i32(model).await.expect("granted protocol count");
        assert_eq!(granted, 1);
        wire::write_i32(model, version).await.expect("version");
        wire::write_i32(model, cells).await.expect("cell count");
        wire::write_i32(model, inputs).await.expect("input count");
        wire::write_i32(model, outputs).await.expect("output count");
    }

    #[tokio::test]
    async fn test_run_completes_channel_free_session() {
        let (mut controller, mut model) = tokio::io::duplex(4096);
        let use_case = RunSessionUseCase::new(ConstantForcing::new(), PROTOCOL_VERSION)
            .with_expected_cells(Some(99));

        let script = tokio::spawn(async move {
            // Declared cell count disagrees with the run configuration;
            // the session must still complete.
            declare_run(&mut model, PROTOCOL_VERSION, 1, 0, 0).await;
        });

        let summary = use_case
            .run(&mut controller)
            .await
            .expect("session must succeed");
        script.await.expect("model script");

        assert_eq!(summary.rounds, 0);
        assert_eq!(summary.session.cell_count(), 1);
    }

    #[tokio::test]
    async fn test_run_propagates_version_mismatch() {
        let (mut controller, mut model) = tokio::io::duplex(4096);
        let use_case = RunSessionUseCase::new(ConstantForcing::new(), PROTOCOL_VERSION);

        let script = tokio::spawn(async move {
            declare_run(&mut model, PROTOCOL_VERSION + 1, 1, 0, 0).await;
        });

        let err = use_case
            .run(&mut controller)
            .await
            .expect_err("session must fail");
        script.await.expect("model script");

        assert!(matches!(err, CouplerError::VersionMismatch { .. }));
    }
}
