// src/lifecycle/coordinator.rs

//! Makes repeated start/stop signals idempotent.
//!
//! A host reload provisions a new app instance, starts it and stops the old
//! one, possibly overlapping. Startup commands must fire once per true
//! process lifetime, not once per reload, so every instance shares one
//! coordinator and only the first start and the last stop fire.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::errors::RunError;
use crate::lifecycle::registry::LifecycleRegistry;
use crate::types::LifecycleEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Stopped,
    Running,
}

#[derive(Debug, Default)]
pub struct LifecycleCoordinator {
    active: AtomicU64,
}

impl LifecycleCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        if self.active.load(Ordering::SeqCst) > 0 {
            LifecycleState::Running
        } else {
            LifecycleState::Stopped
        }
    }

    /// Number of outstanding starts.
    pub fn active(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Fire `startup` on the stopped → running transition only.
    pub async fn on_start(&self, registry: &LifecycleRegistry) -> Result<(), RunError> {
        let previous = self.active.fetch_add(1, Ordering::SeqCst);
        if previous != 0 {
            debug!(active = previous + 1, "already running; skipping startup commands");
            return Ok(());
        }
        registry.fire(LifecycleEvent::Startup).await
    }

    /// Fire `shutdown` on the running → stopped transition only.
    ///
    /// The counter never drops below zero: a stop without a matching start is
    /// ignored, so the next start still fires `startup`.
    pub async fn on_stop(&self, registry: &LifecycleRegistry) -> Result<(), RunError> {
        let decremented = self
            .active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match decremented {
            Err(_) => {
                warn!("stop signalled without a matching start");
                Ok(())
            }
            Ok(1) => registry.fire(LifecycleEvent::Shutdown).await,
            Ok(previous) => {
                debug!(
                    active = previous - 1,
                    "still running elsewhere; skipping shutdown commands"
                );
                Ok(())
            }
        }
    }
}
