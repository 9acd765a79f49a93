//! # coupler-core
//!
//! Shared library for the model coupler containing the wire protocol
//! primitives, the channel and datatype tables, per-session state, and
//! the session engine (handshake plus the annual streaming loop).
//!
//! This crate is used by both the controller and the synthetic model
//! applications.  It has no opinion on sockets or configuration files:
//! everything is generic over `AsyncRead + AsyncWrite` streams.
//!
//! # Architecture overview (for beginners)
//!
//! The coupler connects a gridded vegetation simulation (the "model")
//! to the process that drives it (the "controller") over one TCP
//! connection.  The controller listens, the model connects, and from
//! then on the model paces the run: each simulated year it requests its
//! input channels one by one, runs the timestep, and sends its output
//! channels back.  The run ends when the model sends an explicit
//! end-of-data token in place of the next input request.
//!
//! This crate (`coupler-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – How values travel over the socket.  Everything is
//!   little-endian and unframed: 4-byte tokens announce what follows,
//!   and both ends count values instead of exchanging lengths.
//!
//! - **`domain`** – The closed tables both ends compile in (input
//!   channels and their band counts, output classes, datatypes) and the
//!   `Session` state built up by the handshake.
//!
//! - **`engine`** – The sequencer.  `perform_handshake` negotiates
//!   channels and receives static data; `run_streaming` serves the
//!   per-year exchange until `END_DATA`.

// Declare the three top-level modules.  Rust will look for each in a
// subdirectory with the same name (e.g., src/protocol/mod.rs).
pub mod domain;
pub mod engine;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `coupler_core::Session` instead of `coupler_core::domain::session::Session`.
pub use domain::channels::{
    Datatype, InputKind, OutputClass, OUTPUT_COUNTRY, OUTPUT_GLOBAL_FLUX, OUTPUT_GRID,
    OUTPUT_REGION,
};
pub use domain::session::{InputSlot, OutputSlot, Session};
pub use engine::{perform_handshake, run_session, run_streaming, Forcing, SessionSummary};
pub use protocol::token::{
    Token, COORDINATE_SCALE, DEFAULT_PORT, PROTOCOL_VERSION, READY_BYTE,
};
pub use protocol::wire::CouplerError;
