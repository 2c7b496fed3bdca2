// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::command::SinkSpec;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [[command]]
/// command = "echo"
/// args = ["booting"]
/// at = ["startup"]
///
/// [handler.deploy]
/// command = "./deploy.sh"
/// args = ["{branch}"]
/// foreground = true
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Lifecycle-bound commands from `[[command]]`, in file order.
    #[serde(default, rename = "command")]
    pub commands: Vec<CommandConfig>,

    /// Request-triggered commands from `[handler.<name>]`.
    #[serde(default)]
    pub handler: BTreeMap<String, CommandConfig>,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>`, so every lifecycle
/// command has at least one event and no handler is bound to one.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub commands: Vec<CommandConfig>,
    pub handler: BTreeMap<String, CommandConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        commands: Vec<CommandConfig>,
        handler: BTreeMap<String, CommandConfig>,
    ) -> Self {
        Self { commands, handler }
    }
}

/// Raw fields of one declared command.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct CommandConfig {
    /// Program to execute. Required.
    #[serde(default)]
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory; empty means the host's current directory.
    #[serde(default)]
    pub directory: String,

    /// Block the caller until the process exits.
    #[serde(default)]
    pub foreground: bool,

    /// Timeout string (e.g. `"10s"`). Defaults to 10 seconds when unset.
    #[serde(default)]
    pub timeout: Option<String>,

    /// Lifecycle events (`"startup"`, `"shutdown"`).
    #[serde(default)]
    pub at: Vec<String>,

    /// Sink for stdout. Defaults to stderr.
    #[serde(default)]
    pub log: Option<SinkSpec>,

    /// Sink for stderr. Defaults to the stdout sink.
    #[serde(default)]
    pub err_log: Option<SinkSpec>,
}
