// src/lifecycle/registry.rs

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, info};

use crate::command::Command;
use crate::errors::RunError;
use crate::exec;
use crate::types::LifecycleEvent;

/// Something the registry can invoke for an event.
///
/// Production code registers commands through [`LifecycleRegistry::register`];
/// tests can provide their own implementation that doesn't spawn processes.
pub trait Runner: Send + Sync {
    fn run(&self) -> Pin<Box<dyn Future<Output = Result<(), RunError>> + Send + '_>>;

    /// Short label for logs.
    fn label(&self) -> String;
}

/// Runs a command in the foreground whatever its own flag says, so a failing
/// startup command is known before boot continues.
struct ForegroundCommand(Arc<Command>);

impl Runner for ForegroundCommand {
    fn run(&self) -> Pin<Box<dyn Future<Output = Result<(), RunError>> + Send + '_>> {
        Box::pin(async move { exec::run_foreground(&self.0, None).await.map(|_| ()) })
    }

    fn label(&self) -> String {
        self.0.program().to_string()
    }
}

/// Commands grouped by the event they are bound to, in registration order.
#[derive(Default)]
pub struct LifecycleRegistry {
    events: BTreeMap<LifecycleEvent, Vec<Arc<dyn Runner>>>,
}

impl fmt::Debug for LifecycleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<_, _> = self.events.iter().map(|(e, r)| (*e, r.len())).collect();
        f.debug_struct("LifecycleRegistry")
            .field("events", &counts)
            .finish()
    }
}

impl LifecycleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `command` to the list of every event it is bound to.
    pub fn register(&mut self, command: Arc<Command>) {
        let runner: Arc<dyn Runner> = Arc::new(ForegroundCommand(Arc::clone(&command)));
        for event in command.events() {
            self.register_runner(*event, Arc::clone(&runner));
        }
    }

    pub fn register_runner(&mut self, event: LifecycleEvent, runner: Arc<dyn Runner>) {
        self.events.entry(event).or_default().push(runner);
    }

    /// Number of runners bound to `event`.
    pub fn len(&self, event: LifecycleEvent) -> usize {
        self.events.get(&event).map_or(0, Vec::len)
    }

    /// Run everything bound to `event`, one at a time, stopping at the first
    /// failure.
    pub async fn fire(&self, event: LifecycleEvent) -> Result<(), RunError> {
        let Some(runners) = self.events.get(&event) else {
            debug!(%event, "no commands bound to event");
            return Ok(());
        };

        info!(%event, commands = runners.len(), "running lifecycle commands");

        for (index, runner) in runners.iter().enumerate() {
            debug!(%event, index, command = %runner.label(), "running lifecycle command");
            runner.run().await?;
        }

        Ok(())
    }
}
