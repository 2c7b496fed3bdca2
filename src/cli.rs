// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `hookexec`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hookexec",
    version,
    about = "Run shell commands at startup, at shutdown, or on demand.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Hookexec.toml")]
    pub config: String,

    /// Run the named handler once, print its status payload and exit.
    #[arg(long, value_name = "NAME")]
    pub trigger: Option<String>,

    /// Placeholder value for `--trigger`, e.g. `--param branch=main`.
    #[arg(
        long = "param",
        value_name = "KEY=VALUE",
        value_parser = parse_param,
        requires = "trigger"
    )]
    pub params: Vec<(String, String)>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOOKEXEC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + provision, print the commands, but don't execute any.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
