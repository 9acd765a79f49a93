//! Protocol module containing the token framing and the wire primitives.

pub mod token;
pub mod wire;

pub use token::{Token, COORDINATE_SCALE, DEFAULT_PORT, PROTOCOL_VERSION, READY_BYTE};
pub use wire::CouplerError;
