// src/command/mod.rs

//! Provisioned command descriptors and their output sinks.
//!
//! - [`descriptor`] holds [`Command`], the immutable result of provisioning.
//! - [`sink`] describes where output goes and wraps open writers.
//! - [`cache`] shares open writers between commands by sink identity.

pub mod cache;
pub mod descriptor;
pub mod sink;

pub use cache::WriterCache;
pub use descriptor::{Command, DEFAULT_TIMEOUT};
pub use sink::{SharedWriter, SinkSpec};
