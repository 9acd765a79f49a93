//! Application layer use cases for the controller.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure protocol and session rules, here provided by `coupler-core`) and
//! the infrastructure (sockets, configuration files).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** the engine to fulfil one run (e.g., "accept the model
//!   connection and drive the session to completion").
//! - **Depend on abstractions** (the `Forcing` trait, generic streams)
//!   rather than concrete sockets, so tests can drive them in memory.
//! - **Contain no socket setup and no file system access**.
//!
//! # Sub-modules
//!
//! - **`forcing`**     – The constant-valued input source supplied to the
//!   engine: which channels it offers and what value each one carries.
//!
//! - **`run_session`** – Drives one accepted connection through handshake
//!   and the yearly exchange, applying the run-configuration cross-checks.

pub mod forcing;
pub mod run_session;
