//! Application layer for the synthetic model.
//!
//! # Sub-modules
//!
//! - **`scenario`** – What one synthetic run looks like: cell count,
//!   years, channels, the declared protocol version, and the formula
//!   behind every synthetic value.
//!
//! - **`driver`** – Plays the model side of the wire exchange for one
//!   scenario, from greeting to `END_DATA`, and reports what it saw.

pub mod driver;
pub mod scenario;
