//! Per-connection session state.
//!
//! A [`Session`] is built once by the handshake and then owned by the
//! streaming loop; nothing else touches it while the connection lives.
//! After the handshake only the per-step value buffers change; the
//! negotiated tables are fixed for the session lifetime.

use crate::domain::channels::{Datatype, InputKind, OutputClass};

/// One negotiated input channel, in negotiation order.
#[derive(Debug, Clone)]
pub struct InputSlot {
    /// Raw index the model requested.
    pub index: i32,
    /// The known quantity behind the index, if it is in the table.
    pub kind: Option<InputKind>,
    /// Bands the controller answered with; 0 marks the channel
    /// unsupported, and it must never be requested during streaming.
    pub band_count: i32,
}

impl InputSlot {
    /// Floats exchanged for this channel per step.
    pub fn value_count(&self, cell_count: usize) -> usize {
        let Some(kind) = self.kind else { return 0 };
        if self.band_count <= 0 {
            return 0;
        }
        let bands = self.band_count as usize;
        if kind.is_spatially_uniform() {
            bands
        } else {
            bands * cell_count
        }
    }
}

/// One negotiated output channel, in negotiation order.
#[derive(Debug, Clone)]
pub struct OutputSlot {
    /// Index the model declared.
    pub index: i32,
    /// Temporal resolution the model declared (informational).
    pub step_count: i32,
    /// Values per cell per step.
    pub band_count: i32,
    /// Element type of the payload.
    pub datatype: Datatype,
    /// Derived once during negotiation, fixed afterwards.
    pub class: OutputClass,
    /// Most recent step's values, band-major. Empty for Static slots,
    /// whose payload is transferred before the main loop.
    pub values: Vec<f32>,
}

impl OutputSlot {
    /// Builds a slot from negotiated metadata; the value buffer is
    /// allocated when the slot joins a [`Session`].
    pub fn new(
        index: i32,
        step_count: i32,
        band_count: i32,
        datatype: Datatype,
        class: OutputClass,
    ) -> Self {
        Self {
            index,
            step_count,
            band_count,
            datatype,
            class,
            values: Vec::new(),
        }
    }

    /// Floats stored for this channel per main-loop step.
    pub fn value_count(&self, cell_count: usize) -> usize {
        let bands = self.band_count.max(0) as usize;
        match self.class {
            OutputClass::Static => 0,
            OutputClass::GlobalAggregate => bands,
            OutputClass::Gridded => bands * cell_count,
        }
    }

    /// Size in bytes of a one-time static payload with this slot's shape.
    pub fn static_payload_bytes(&self, cell_count: usize) -> usize {
        let bands = self.band_count.max(0) as usize;
        cell_count * bands * self.datatype.wire_size()
    }
}

/// State of one accepted coupling session.
#[derive(Debug, Default)]
pub struct Session {
    cell_count: usize,
    inputs: Vec<InputSlot>,
    outputs: Vec<OutputSlot>,
    static_count: usize,
    grid: Vec<(f32, f32)>,
}

impl Session {
    /// Creates an empty session for `cell_count` spatial cells.
    pub fn new(cell_count: usize) -> Self {
        Self {
            cell_count,
            ..Self::default()
        }
    }

    /// Number of spatial grid cells, fixed for the session lifetime.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Negotiated input channels, in negotiation order.
    pub fn inputs(&self) -> &[InputSlot] {
        &self.inputs
    }

    /// Negotiated output channels, in negotiation order.
    pub fn outputs(&self) -> &[OutputSlot] {
        &self.outputs
    }

    /// Number of negotiated input channels.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Channels classified Static during negotiation.
    pub fn static_count(&self) -> usize {
        self.static_count
    }

    /// Output channels the main loop exchanges per round.
    ///
    /// Static channels are drained once before the loop starts and never
    /// reappear in this count.
    pub fn active_output_count(&self) -> usize {
        self.outputs.len() - self.static_count
    }

    /// Records an input channel negotiated with the model.
    pub fn push_input(&mut self, slot: InputSlot) {
        self.inputs.push(slot);
    }

    /// Records an output channel and allocates its per-step buffer.
    pub fn push_output(&mut self, mut slot: OutputSlot) {
        if slot.class == OutputClass::Static {
            self.static_count += 1;
        }
        slot.values = vec![0.0; slot.value_count(self.cell_count)];
        self.outputs.push(slot);
    }

    /// Looks up an input channel by its wire index.
    pub fn input_by_index(&self, index: i32) -> Option<&InputSlot> {
        self.inputs.iter().find(|slot| slot.index == index)
    }

    /// Resolves an input request into the quantity and its per-step
    /// value count, or `None` when the channel was not negotiated as
    /// supported.
    pub fn supplyable_input(&self, index: i32) -> Option<(InputKind, usize)> {
        let slot = self.input_by_index(index)?;
        let kind = slot.kind?;
        if slot.band_count <= 0 {
            return None;
        }
        Some((kind, slot.value_count(self.cell_count)))
    }

    /// Looks up an output channel by its wire index.
    pub fn output_by_index(&self, index: i32) -> Option<&OutputSlot> {
        self.outputs.iter().find(|slot| slot.index == index)
    }

    /// Mutable lookup used by the streaming loop to store a step.
    pub fn output_by_index_mut(&mut self, index: i32) -> Option<&mut OutputSlot> {
        self.outputs.iter_mut().find(|slot| slot.index == index)
    }

    /// Stores the decoded grid coordinates received during the static
    /// transfer. Written once; read-only afterwards.
    pub fn set_grid(&mut self, coordinates: Vec<(f32, f32)>) {
        self.grid = coordinates;
    }

    /// Per-cell (longitude, latitude) pairs, empty until the grid
    /// channel's static transfer completes.
    pub fn grid(&self) -> &[(f32, f32)] {
        &self.grid
    }

    /// Values of the global flux aggregate from the last completed
    /// round, if such a channel was negotiated.
    pub fn flux(&self) -> Option<&[f32]> {
        self.outputs
            .iter()
            .find(|slot| slot.class == OutputClass::GlobalAggregate)
            .map(|slot| slot.values.as_slice())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
