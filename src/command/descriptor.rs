// src/command/descriptor.rs

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::cache::WriterCache;
use crate::command::sink::{SharedWriter, SinkSpec};
use crate::config::model::CommandConfig;
use crate::config::parse_timeout;
use crate::errors::{HookexecError, Result};
use crate::types::LifecycleEvent;

/// Timeout applied when the config does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A provisioned, read-only command.
///
/// Built once from a [`CommandConfig`] by [`Command::provision`]; there are no
/// setters. Per-invocation argument overrides are passed to the runner and
/// never written back here.
#[derive(Debug, Clone)]
pub struct Command {
    program: String,
    args: Vec<String>,
    directory: Option<PathBuf>,
    foreground: bool,
    timeout: Option<Duration>,
    events: BTreeSet<LifecycleEvent>,
    stdout: SharedWriter,
    stderr: SharedWriter,
}

impl Command {
    /// Validate `config`, parse its timeout, normalise its events and resolve
    /// its sinks through `writers`.
    pub fn provision(config: CommandConfig, writers: &WriterCache) -> Result<Self> {
        if config.command.is_empty() {
            return Err(HookexecError::config("command is required"));
        }

        let directory = validate_directory(&config.directory)?;

        let timeout = match config.timeout.as_deref() {
            None => Some(DEFAULT_TIMEOUT),
            Some(s) => parse_timeout(s).map_err(HookexecError::ConfigError)?,
        };

        let events = config
            .at
            .iter()
            .map(|s| s.parse::<LifecycleEvent>())
            .collect::<std::result::Result<BTreeSet<_>, _>>()
            .map_err(HookexecError::ConfigError)?;

        let stdout_spec = config.log.unwrap_or_default();
        let stdout = resolve_sink(writers, &stdout_spec)?;
        let stderr = match config.err_log {
            Some(spec) => resolve_sink(writers, &spec)?,
            None => stdout.clone(),
        };

        Ok(Self {
            program: config.command,
            args: config.args,
            directory,
            foreground: config.foreground,
            timeout,
            events,
            stdout,
            stderr,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// `None` means the host's current directory.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn foreground(&self) -> bool {
        self.foreground
    }

    /// `None` when the timeout is disabled.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn events(&self) -> &BTreeSet<LifecycleEvent> {
        &self.events
    }

    pub fn stdout(&self) -> &SharedWriter {
        &self.stdout
    }

    pub fn stderr(&self) -> &SharedWriter {
        &self.stderr
    }

    /// Program followed by `args`, as logged.
    pub fn command_line(&self, args: &[String]) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(args.iter().cloned())
            .collect()
    }
}

fn validate_directory(dir: &str) -> Result<Option<PathBuf>> {
    if dir.is_empty() {
        return Ok(None);
    }

    let meta = fs::metadata(dir)
        .map_err(|e| HookexecError::config(format!("stat '{dir}': {e}")))?;
    if !meta.is_dir() {
        return Err(HookexecError::config(format!("not a directory '{dir}'")));
    }

    Ok(Some(PathBuf::from(dir)))
}

fn resolve_sink(writers: &WriterCache, spec: &SinkSpec) -> Result<SharedWriter> {
    writers.resolve(spec).map_err(|e| {
        HookexecError::config(format!("opening sink '{}': {e}", spec.cache_key()))
    })
}
