// src/app.rs

//! One provisioned configuration, as seen by the host.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::command::{Command, WriterCache};
use crate::config::ConfigFile;
use crate::errors::{HookexecError, Result};
use crate::handler::CommandHandler;
use crate::lifecycle::{LifecycleCoordinator, LifecycleEvent, LifecycleRegistry};

/// Lifecycle commands plus route-bound handlers for one config generation.
///
/// On reload the host provisions a fresh `ExecApp` against the same
/// coordinator and writer cache, starts it, then stops the previous one.
#[derive(Debug)]
pub struct ExecApp {
    registry: LifecycleRegistry,
    commands: Vec<Arc<Command>>,
    handlers: BTreeMap<String, CommandHandler>,
    coordinator: Arc<LifecycleCoordinator>,
}

impl ExecApp {
    pub fn provision(
        config: ConfigFile,
        writers: &WriterCache,
        coordinator: Arc<LifecycleCoordinator>,
    ) -> Result<Self> {
        let mut registry = LifecycleRegistry::new();
        let mut commands = Vec::with_capacity(config.commands.len());

        for (index, raw) in config.commands.into_iter().enumerate() {
            let command = Command::provision(raw, writers).map_err(|e| match e {
                HookexecError::ConfigError(msg) => {
                    HookexecError::ConfigError(format!("command #{}: {msg}", index + 1))
                }
                other => other,
            })?;
            let command = Arc::new(command);
            registry.register(Arc::clone(&command));
            commands.push(command);
        }

        let mut handlers = BTreeMap::new();
        for (name, raw) in config.handler {
            let command = Command::provision(raw, writers).map_err(|e| match e {
                HookexecError::ConfigError(msg) => {
                    HookexecError::ConfigError(format!("handler '{name}': {msg}"))
                }
                other => other,
            })?;
            handlers.insert(name.clone(), CommandHandler::new(name, Arc::new(command)));
        }

        info!(
            startup = registry.len(LifecycleEvent::Startup),
            shutdown = registry.len(LifecycleEvent::Shutdown),
            handlers = handlers.len(),
            "provisioned commands"
        );

        Ok(Self {
            registry,
            commands,
            handlers,
            coordinator,
        })
    }

    /// Host started serving.
    pub async fn start(&self) -> Result<()> {
        self.coordinator.on_start(&self.registry).await?;
        Ok(())
    }

    /// Host is terminating.
    pub async fn stop(&self) -> Result<()> {
        self.coordinator.on_stop(&self.registry).await?;
        Ok(())
    }

    pub fn handler(&self, name: &str) -> Option<&CommandHandler> {
        self.handlers.get(name)
    }

    pub fn handlers(&self) -> impl Iterator<Item = &CommandHandler> {
        self.handlers.values()
    }

    /// Lifecycle commands in registration order.
    pub fn commands(&self) -> &[Arc<Command>] {
        &self.commands
    }

    pub fn registry(&self) -> &LifecycleRegistry {
        &self.registry
    }
}
