//! Infrastructure layer for the controller.
//!
//! Contains OS-facing adapters: the TCP listener and the configuration
//! file readers.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `coupler_core`, but MUST NOT be imported by the `application` layer.

pub mod network;
pub mod storage;
