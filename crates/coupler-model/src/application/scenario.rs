//! Run scenarios for the synthetic model.
//!
//! A [`Scenario`] fixes everything the model will declare and send, so a
//! run is reproducible end to end. All data values come from
//! [`synthetic_value`], a formula over small quarter-steps that is exact
//! in `f32`, which lets tests assert received values with plain
//! equality.

use coupler_core::{
    Datatype, InputKind, OutputClass, OUTPUT_GLOBAL_FLUX, OUTPUT_GRID, PROTOCOL_VERSION,
};

/// One output channel the scenario declares.
#[derive(Debug, Clone)]
pub struct OutputSpec {
    pub index: i32,
    pub bands: i32,
    pub datatype: Datatype,
}

impl OutputSpec {
    pub fn new(index: i32, bands: i32, datatype: Datatype) -> Self {
        Self {
            index,
            bands,
            datatype,
        }
    }

    /// Classification the controller will apply to this index.
    pub fn class(&self) -> OutputClass {
        OutputClass::for_index(self.index)
    }
}

/// Complete description of one synthetic run.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Grid cells the model declares.
    pub cells: i32,
    /// First simulation year.
    pub start_year: i32,
    /// Rounds to exchange before `END_DATA`.
    pub years: i32,
    /// Version sent during the handshake. Setting it away from
    /// [`PROTOCOL_VERSION`] exercises the rejection path.
    pub declared_version: i32,
    /// Input channel indices to request, in negotiation order.
    pub inputs: Vec<i32>,
    /// Output channels to declare, in negotiation order.
    pub outputs: Vec<OutputSpec>,
}

impl Default for Scenario {
    /// Small demo run: 4 cells, 5 years, temperature and CO2 in, grid
    /// coordinates, global flux, and one gridded carbon pool out.
    fn default() -> Self {
        Self {
            cells: 4,
            start_year: 2001,
            years: 5,
            declared_version: PROTOCOL_VERSION,
            inputs: vec![
                InputKind::Temperature.index(),
                InputKind::Co2.index(),
            ],
            outputs: vec![
                OutputSpec::new(OUTPUT_GRID, 1, Datatype::Short),
                OutputSpec::new(OUTPUT_GLOBAL_FLUX, 2, Datatype::Float),
                OutputSpec::new(4, 1, Datatype::Float),
            ],
        }
    }
}

/// Deterministic value for one output sample.
///
/// Built from quarter steps so every result is exactly representable in
/// `f32` and can be compared with `==` on the receiving side.
pub fn synthetic_value(index: i32, band: i32, cell: i32, step: i32) -> f32 {
    index as f32 + band as f32 * 0.5 + cell as f32 * 0.25 + step as f32 * 2.0
}

/// Raw 16-bit coordinate pair for `cell`, within world bounds after the
/// 0.01 decode scale.
pub fn grid_raw(cell: i32) -> (i16, i16) {
    let lon = ((cell % 360) * 100 - 17950) as i16;
    let lat = ((cell % 180) * 100 - 8950) as i16;
    (lon, lat)
}
