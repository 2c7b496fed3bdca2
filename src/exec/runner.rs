// src/exec/runner.rs

//! Runs one OS process for a [`Command`].

use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::process::{Child, Command as ProcessCommand};
use tracing::{debug, error, info, warn};

use crate::command::{Command, SharedWriter};
use crate::errors::RunError;
use crate::exec::deadline::Deadline;
use crate::exec::output::{
    EXIT_DRAIN_GRACE, KILLED_DRAIN_GRACE, Straggler, join_pumps, spawn_pump,
};

/// Result of a finished foreground invocation.
#[derive(Debug, Clone)]
pub struct Completion {
    pub command_line: Vec<String>,
    pub elapsed: Duration,
    pub status: ExitStatus,
}

/// What the caller of [`run`] observes.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Foreground: the process exited successfully.
    Exited(Completion),
    /// Background: the process started; its exit is only logged.
    Spawned { pid: Option<u32> },
}

/// Run `command`, honouring its foreground flag.
///
/// `args` replaces the configured arguments for this invocation only.
pub async fn run(command: &Command, args: Option<Vec<String>>) -> Result<RunOutcome, RunError> {
    execute(command, args, command.foreground()).await
}

/// Run `command` and wait for it regardless of its foreground flag.
pub async fn run_foreground(
    command: &Command,
    args: Option<Vec<String>>,
) -> Result<Completion, RunError> {
    match execute(command, args, true).await? {
        RunOutcome::Exited(completion) => Ok(completion),
        RunOutcome::Spawned { .. } => unreachable!("foreground invocation always waits"),
    }
}

async fn execute(
    command: &Command,
    args: Option<Vec<String>>,
    foreground: bool,
) -> Result<RunOutcome, RunError> {
    let args = args.unwrap_or_else(|| command.args().to_vec());
    let command_line = command.command_line(&args);
    let started = Instant::now();

    let mut cmd = ProcessCommand::new(command.program());
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = command.directory() {
        cmd.current_dir(dir);
    }

    debug!(command = ?command_line, foreground, "starting command");

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(source) => {
            let err = RunError::Start {
                program: command.program().to_string(),
                source,
            };
            log_exit(&command_line, started.elapsed(), Err(&err));
            return Err(err);
        }
    };

    let pid = child.id();
    let waiter = Waiter {
        child,
        program: command.program().to_string(),
        command_line,
        started,
        timeout: command.timeout(),
        stdout: command.stdout().clone(),
        stderr: command.stderr().clone(),
    };

    if foreground {
        waiter.wait().await.map(RunOutcome::Exited)
    } else {
        tokio::spawn(async move {
            // The outcome has already been logged.
            let _ = waiter.wait().await;
        });
        Ok(RunOutcome::Spawned { pid })
    }
}

/// Everything the wait step needs, owned so it can move to a detached task.
struct Waiter {
    child: Child,
    program: String,
    command_line: Vec<String>,
    started: Instant,
    timeout: Option<Duration>,
    stdout: SharedWriter,
    stderr: SharedWriter,
}

impl Waiter {
    /// Wait for exit, killing the child if its deadline passes first, then log
    /// the single completion record.
    async fn wait(mut self) -> Result<Completion, RunError> {
        let mut pumps = Vec::with_capacity(2);
        if let Some(out) = self.child.stdout.take() {
            pumps.push(spawn_pump(out, self.stdout.clone(), "stdout"));
        }
        if let Some(err) = self.child.stderr.take() {
            pumps.push(spawn_pump(err, self.stderr.clone(), "stderr"));
        }

        let mut killed = false;
        let status = match self.timeout {
            Some(timeout) => {
                let mut deadline = Deadline::start(timeout);
                let status = tokio::select! {
                    status = self.child.wait() => status,
                    _ = deadline.expired() => {
                        killed = true;
                        warn!(
                            command = ?self.command_line,
                            ?timeout,
                            "timeout elapsed; killing process"
                        );
                        if let Err(e) = self.child.start_kill() {
                            debug!(
                                command = ?self.command_line,
                                error = %e,
                                "kill failed; process may have exited"
                            );
                        }
                        self.child.wait().await
                    }
                };
                let _ = deadline.defuse().await;
                status
            }
            None => self.child.wait().await,
        };

        if killed {
            join_pumps(pumps, KILLED_DRAIN_GRACE, Straggler::Abort).await;
        } else {
            join_pumps(pumps, EXIT_DRAIN_GRACE, Straggler::Detach).await;
        }

        let elapsed = self.started.elapsed();
        let result = match status {
            Ok(status) if status.success() => Ok(Completion {
                command_line: self.command_line.clone(),
                elapsed,
                status,
            }),
            Ok(status) => Err(RunError::Exit {
                program: self.program.clone(),
                status,
            }),
            Err(source) => Err(RunError::Wait {
                program: self.program.clone(),
                source,
            }),
        };

        log_exit(&self.command_line, elapsed, result.as_ref().map(|_| ()));
        result
    }
}

/// The one record emitted per invocation.
fn log_exit(command_line: &[String], elapsed: Duration, result: Result<(), &RunError>) {
    match result {
        Ok(()) => info!(command = ?command_line, duration = ?elapsed, "command exited"),
        Err(err) => error!(
            command = ?command_line,
            duration = ?elapsed,
            error = %err,
            "command exited"
        ),
    }
}
