// src/lifecycle/mod.rs

//! Startup/shutdown orchestration.
//!
//! - [`registry`] groups commands by event and runs them in order.
//! - [`coordinator`] decides whether a start/stop signal should fire at all.

pub mod coordinator;
pub mod registry;

pub use crate::types::LifecycleEvent;
pub use coordinator::{LifecycleCoordinator, LifecycleState};
pub use registry::{LifecycleRegistry, Runner};
