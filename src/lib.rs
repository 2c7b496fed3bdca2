// src/lib.rs

pub mod app;
pub mod cli;
pub mod command;
pub mod config;
pub mod errors;
pub mod exec;
pub mod handler;
pub mod lifecycle;
pub mod logging;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, error, info, warn};

use crate::app::ExecApp;
use crate::cli::CliArgs;
use crate::command::{Command, WriterCache};
use crate::config::load_and_validate;
use crate::handler::Placeholders;
use crate::lifecycle::LifecycleCoordinator;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and provisioning
/// - startup commands (a failure aborts boot)
/// - SIGHUP reloads against the same coordinator
/// - Ctrl-C → shutdown commands
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = Path::new(&args.config);
    let writers = WriterCache::new();
    let coordinator = Arc::new(LifecycleCoordinator::new());

    let app = provision_app(config_path, &writers, &coordinator)?;

    if args.dry_run {
        print_dry_run(&app);
        return Ok(());
    }

    if let Some(name) = args.trigger.as_deref() {
        return trigger(&app, name, &args.params).await;
    }

    app.start().await.context("startup commands failed")?;
    info!("startup complete; waiting for signals");

    let app = serve(app, config_path, &writers, &coordinator).await;

    app.stop().await.context("shutdown commands failed")?;
    info!("shutdown complete");
    Ok(())
}

fn provision_app(
    config_path: &Path,
    writers: &WriterCache,
    coordinator: &Arc<LifecycleCoordinator>,
) -> Result<ExecApp> {
    let cfg = load_and_validate(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let app = ExecApp::provision(cfg, writers, Arc::clone(coordinator))?;
    Ok(app)
}

/// Block until Ctrl-C, reloading on SIGHUP. Returns the app that is live at
/// shutdown time.
async fn serve(
    mut app: ExecApp,
    config_path: &Path,
    writers: &WriterCache,
    coordinator: &Arc<LifecycleCoordinator>,
) -> ExecApp {
    #[cfg(unix)]
    let mut hangup = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup()) {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!(error = %e, "failed to listen for SIGHUP; reload disabled");
            None
        }
    };

    loop {
        #[cfg(unix)]
        let reload = async {
            if let Some(stream) = hangup.as_mut() {
                if stream.recv().await.is_some() {
                    return;
                }
            }
            std::future::pending::<()>().await
        };
        #[cfg(not(unix))]
        let reload = std::future::pending::<()>();

        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!(error = %e, "failed to listen for Ctrl+C; shutting down");
                }
                info!("shutdown requested");
                return app;
            }
            _ = reload => {
                app = reload_app(app, config_path, writers, coordinator).await;
            }
        }
    }
}

/// Provision the config again, start the new generation, stop the old one.
///
/// Both signals are absorbed by the shared coordinator, so no startup or
/// shutdown command fires because of a reload.
async fn reload_app(
    old: ExecApp,
    config_path: &Path,
    writers: &WriterCache,
    coordinator: &Arc<LifecycleCoordinator>,
) -> ExecApp {
    info!(config = %config_path.display(), "reload requested");

    let new = match provision_app(config_path, writers, coordinator) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %format!("{e:#}"), "reload failed; keeping current config");
            return old;
        }
    };

    if let Err(e) = new.start().await {
        error!(error = %e, "starting reloaded config failed");
    }
    if let Err(e) = old.stop().await {
        error!(error = %e, "stopping previous config failed");
    }

    debug!(active = coordinator.active(), "reload complete");
    new
}

/// Run one handler as if a request had arrived, printing its payload.
async fn trigger(app: &ExecApp, name: &str, params: &[(String, String)]) -> Result<()> {
    let handler = app
        .handler(name)
        .ok_or_else(|| anyhow!("unknown handler '{name}'"))?;

    let mut placeholders = Placeholders::new();
    for (key, value) in params {
        placeholders.insert(key.as_str(), value.as_str());
    }

    let response = handler.handle(&placeholders).await;
    println!("{}", response.to_json());

    if !response.is_success() {
        bail!("handler '{name}' failed with status {}", response.status_code);
    }
    Ok(())
}

/// Simple dry-run output: print the provisioned commands.
fn print_dry_run(app: &ExecApp) {
    println!("hookexec dry-run");
    println!();

    println!("commands ({}):", app.commands().len());
    for command in app.commands() {
        let events: Vec<_> = command.events().iter().map(|e| e.as_str()).collect();
        println!("  - {}", command.program());
        println!("      at: {events:?}");
        print_command_details(command);
    }

    let handlers: Vec<_> = app.handlers().collect();
    println!("handlers ({}):", handlers.len());
    for handler in handlers {
        println!("  - {}: {}", handler.name(), handler.command().program());
        print_command_details(handler.command());
    }

    debug!("dry-run complete (no execution)");
}

fn print_command_details(command: &Command) {
    if !command.args().is_empty() {
        println!("      args: {:?}", command.args());
    }
    if let Some(dir) = command.directory() {
        println!("      directory: {}", dir.display());
    }
    match command.timeout() {
        Some(timeout) => println!("      timeout: {timeout:?}"),
        None => println!("      timeout: none"),
    }
    if command.foreground() {
        println!("      foreground: true");
    }
    println!("      log: {}", command.stdout().key());
    if command.stderr().key() != command.stdout().key() {
        println!("      err_log: {}", command.stderr().key());
    }
}
