//! Domain types for the coupling engine.
//!
//! Pure state and tables with no I/O: the closed channel enumeration
//! shared with the simulation binary, and the per-connection session
//! state the handshake builds and the streaming loop owns.

pub mod channels;
pub mod session;
