// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`runner`] spawns and supervises one process per invocation.
//! - [`deadline`] is the timeout watcher that kills hung processes.
//! - [`output`] copies child stdout/stderr into the configured sinks.

pub mod deadline;
pub mod output;
pub mod runner;

pub use deadline::Deadline;
pub use runner::{run, run_foreground, Completion, RunOutcome};
