//! coupler-model library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does coupler-model do? (for beginners)
//!
//! The real model is a large compiled simulation that takes hours per
//! run. This crate is its stand-in: a synthetic peer that speaks the
//! same wire protocol with deterministic data, small enough to run in a
//! test and predictable enough to assert against.
//!
//! A run of the synthetic model:
//!
//! 1. Connects to the controller over TCP (with retries, since the
//!    controller may come up a moment later).
//! 2. Sends the greeting integers and its protocol version.
//! 3. Declares its cell count, then negotiates every input channel of
//!    its [`Scenario`] and declares every output channel.
//! 4. Transfers the static outputs (grid coordinates first).
//! 5. Exchanges one round per simulated year: requests each input,
//!    sends deterministic values for each non-static output.
//! 6. Sends `END_DATA` and disconnects.
//!
//! [`Scenario`]: application::scenario::Scenario

/// Application layer: the run scenario and the session driver.
pub mod application;

/// Infrastructure layer: the TCP connector.
pub mod infrastructure;
