#![allow(dead_code)]

use std::path::Path;

use hookexec::command::{Command, SinkSpec, WriterCache};
use hookexec::config::{CommandConfig, ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_command(mut self, command: CommandConfig) -> Self {
        self.config.commands.push(command);
        self
    }

    pub fn with_handler(mut self, name: &str, command: CommandConfig) -> Self {
        self.config.handler.insert(name.to_string(), command);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `CommandConfig`.
pub struct CommandConfigBuilder {
    command: CommandConfig,
}

impl CommandConfigBuilder {
    pub fn new(program: &str) -> Self {
        Self {
            command: CommandConfig {
                command: program.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.command.args.push(arg.to_string());
        self
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.command.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    pub fn directory(mut self, dir: impl AsRef<Path>) -> Self {
        self.command.directory = dir.as_ref().to_string_lossy().into_owned();
        self
    }

    pub fn foreground(mut self, val: bool) -> Self {
        self.command.foreground = val;
        self
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.command.timeout = Some(timeout.to_string());
        self
    }

    pub fn at(mut self, event: &str) -> Self {
        self.command.at.push(event.to_string());
        self
    }

    pub fn log(mut self, sink: SinkSpec) -> Self {
        self.command.log = Some(sink);
        self
    }

    /// Send stdout to `path`.
    pub fn log_file(self, path: impl AsRef<Path>) -> Self {
        self.log(SinkSpec::File {
            filename: path.as_ref().to_path_buf(),
        })
    }

    pub fn err_log(mut self, sink: SinkSpec) -> Self {
        self.command.err_log = Some(sink);
        self
    }

    pub fn build(self) -> CommandConfig {
        self.command
    }

    /// Build and provision against a throwaway writer cache.
    pub fn provision(self) -> Command {
        Command::provision(self.command, &WriterCache::new())
            .expect("Failed to provision command from builder")
    }
}
