//! End-to-end tests of the model driver against the real session engine.
//!
//! Unlike the scripted-peer tests in `coupler-core`, both sides here are
//! real: the engine runs in a spawned task while [`drive_session`] plays
//! the model over an in-memory duplex stream. Every value is
//! deterministic, so the assertions are exact.

use coupler_core::{run_session, CouplerError, Forcing, InputKind, SessionSummary, PROTOCOL_VERSION};
use coupler_model::application::driver::{drive_session, ModelError, ModelReport};
use coupler_model::application::scenario::{grid_raw, synthetic_value, Scenario};

/// Forcing that supplies every known channel with a per-kind constant.
struct DemoForcing;

impl Forcing for DemoForcing {
    fn band_count(&self, kind: InputKind) -> Option<i32> {
        Some(kind.band_count())
    }

    fn fill(&mut self, kind: InputKind, _year: i32, values: &mut [f32]) -> Result<(), String> {
        let value = match kind {
            InputKind::Co2 => 288.0,
            InputKind::Temperature => 15.5,
            _ => 1.0,
        };
        values.fill(value);
        Ok(())
    }
}

/// Forcing that refuses the temperature channel and supplies the rest.
struct NoTemperatureForcing;

impl Forcing for NoTemperatureForcing {
    fn band_count(&self, kind: InputKind) -> Option<i32> {
        (kind != InputKind::Temperature).then(|| kind.band_count())
    }

    fn fill(&mut self, _kind: InputKind, _year: i32, values: &mut [f32]) -> Result<(), String> {
        values.fill(0.0);
        Ok(())
    }
}

/// Runs engine and driver concurrently over a duplex pipe and returns
/// both ends' results.
async fn run_pair<F>(
    scenario: Scenario,
    mut forcing: F,
) -> (
    Result<SessionSummary, CouplerError>,
    Result<ModelReport, ModelError>,
)
where
    F: Forcing + 'static,
{
    let (mut controller_end, mut model_end) = tokio::io::duplex(1 << 16);
    let engine = tokio::spawn(async move {
        run_session(&mut controller_end, &mut forcing, PROTOCOL_VERSION).await
    });
    let report = drive_session(&mut model_end, &scenario).await;
    let summary = engine.await.expect("engine task");
    (summary, report)
}

#[tokio::test]
async fn test_full_run_exchanges_all_years() {
    let scenario = Scenario::default();
    let years = scenario.years;
    let cells = scenario.cells;

    let (summary, report) = run_pair(scenario, DemoForcing).await;
    let summary = summary.expect("engine side must succeed");
    let report = report.expect("model side must succeed");

    assert_eq!(summary.rounds, years as u64);
    assert_eq!(report.rounds, years);
    assert_eq!(summary.last_year, Some(2001 + years - 1));

    // Both default inputs granted one band each.
    assert_eq!(report.negotiated, vec![(1, 1), (5, 1)]);

    // The grid arrived decoded to hundredths of a degree.
    let grid = summary.session.grid();
    assert_eq!(grid.len(), cells as usize);
    for (cell, &(lon, lat)) in grid.iter().enumerate() {
        let (raw_lon, raw_lat) = grid_raw(cell as i32);
        assert!((lon - f32::from(raw_lon) * 0.01).abs() < 1e-4);
        assert!((lat - f32::from(raw_lat) * 0.01).abs() < 1e-4);
    }

    // Flux holds the final year's aggregate, one value per band.
    let last_step = years - 1;
    assert_eq!(
        summary.session.flux(),
        Some(
            [
                synthetic_value(3, 0, 0, last_step),
                synthetic_value(3, 1, 0, last_step),
            ]
            .as_slice()
        )
    );

    // CO2 is requested last each year and is spatially uniform.
    assert_eq!(report.last_input, vec![288.0]);
}

#[tokio::test]
async fn test_gridded_output_arrives_band_major() {
    let scenario = Scenario::default();
    let cells = scenario.cells;
    let years = scenario.years;

    let (summary, report) = run_pair(scenario, DemoForcing).await;
    let summary = summary.expect("engine side must succeed");
    report.expect("model side must succeed");

    let slot = summary
        .session
        .output_by_index(4)
        .expect("gridded channel negotiated");
    assert_eq!(slot.values.len(), cells as usize);
    let last_step = years - 1;
    for (cell, &value) in slot.values.iter().enumerate() {
        assert_eq!(value, synthetic_value(4, 0, cell as i32, last_step));
    }
}

#[tokio::test]
async fn test_refused_input_ends_run_before_first_year() {
    let (summary, report) = run_pair(Scenario::default(), NoTemperatureForcing).await;
    let summary = summary.expect("engine side must succeed");
    let report = report.expect("model side must succeed");

    // Temperature answered with zero bands; the model gives up cleanly.
    assert_eq!(report.negotiated, vec![(1, 0), (5, 1)]);
    assert_eq!(report.rounds, 0);
    assert_eq!(summary.rounds, 0);
    assert_eq!(summary.last_year, None);
}

#[tokio::test]
async fn test_version_mismatch_fails_both_sides() {
    let scenario = Scenario {
        declared_version: PROTOCOL_VERSION + 1,
        ..Scenario::default()
    };

    let (summary, report) = run_pair(scenario, DemoForcing).await;
    assert!(matches!(
        summary,
        Err(CouplerError::VersionMismatch {
            expected: PROTOCOL_VERSION,
            declared,
        }) if declared == PROTOCOL_VERSION + 1
    ));
    // The engine hangs up right after the version int; the model fails
    // on its next read.
    assert!(report.is_err());
}
