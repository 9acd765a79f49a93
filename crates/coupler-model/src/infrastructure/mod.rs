//! Infrastructure layer for the model application.
//!
//! Everything that touches the operating system lives here; the
//! application layer above works on plain async streams and never sees
//! a socket address.

pub mod network;
