// src/errors.rs

//! Crate-wide error types.
//!
//! - [`HookexecError`] covers configuration, provisioning and host-level
//!   failures.
//! - [`RunError`] is produced by a single command invocation.

use std::io;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookexecError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("lifecycle command failed: {0}")]
    Run(#[from] RunError),
}

impl HookexecError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        HookexecError::ConfigError(msg.into())
    }
}

/// Failure of one command invocation.
///
/// A process killed because its timeout elapsed is reported as
/// [`RunError::Exit`]; its status carries the kill signal.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("starting '{program}': {source}")]
    Start {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' {status}")]
    Exit { program: String, status: ExitStatus },
}

impl RunError {
    pub fn program(&self) -> &str {
        match self {
            RunError::Start { program, .. }
            | RunError::Wait { program, .. }
            | RunError::Exit { program, .. } => program,
        }
    }
}

pub type Result<T> = std::result::Result<T, HookexecError>;
