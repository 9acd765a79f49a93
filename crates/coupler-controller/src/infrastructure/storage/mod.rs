//! Storage infrastructure: configuration file readers.
//!
//! This module is a thin adapter between the application and the file
//! system. Two formats are consumed:
//!
//! - `config` reads the controller's own TOML settings file and falls
//!   back to defaults when it does not exist yet (first run).
//! - `run_config` reads the JSON run description emitted by the external
//!   configuration tool; the controller consumes it and never writes it.
//!
//! Keeping the file formats here means the application layer sees only
//! parsed structs and never touches paths or parsers.

pub mod config;
pub mod run_config;
