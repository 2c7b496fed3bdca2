// tests/config_loading.rs

use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;

use hookexec::app::ExecApp;
use hookexec::command::WriterCache;
use hookexec::config::load_and_validate;
use hookexec::errors::HookexecError;
use hookexec::lifecycle::{LifecycleCoordinator, LifecycleEvent};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn provision(contents: &str) -> hookexec::errors::Result<ExecApp> {
    let file = write_config(contents);
    let cfg = load_and_validate(file.path())?;
    ExecApp::provision(cfg, &WriterCache::new(), Arc::new(LifecycleCoordinator::new()))
}

#[test]
fn provisions_lifecycle_commands_and_handlers() {
    let app = provision(
        r#"
[[command]]
command = "echo"
args = ["booting"]

[[command]]
command = "echo"
args = ["bye"]
at = ["shutdown"]
timeout = "1m"

[handler.deploy]
command = "echo"
args = ["{branch}"]
foreground = true
"#,
    )
    .unwrap();

    assert_eq!(app.registry().len(LifecycleEvent::Startup), 1);
    assert_eq!(app.registry().len(LifecycleEvent::Shutdown), 1);
    assert_eq!(app.commands().len(), 2);

    let deploy = app.handler("deploy").expect("handler should exist");
    assert!(deploy.command().foreground());
    assert!(deploy.command().events().is_empty());
    assert!(app.handler("missing").is_none());
}

#[test]
fn missing_program_is_reported_with_its_position() {
    let result = provision(
        r#"
[[command]]
command = "true"

[[command]]
args = ["orphan"]
"#,
    );

    match result {
        Err(HookexecError::ConfigError(msg)) => {
            assert_eq!(msg, "command #2: command is required");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn invalid_event_is_rejected() {
    let result = provision(
        r#"
[[command]]
command = "true"
at = ["reload"]
"#,
    );

    match result {
        Err(HookexecError::ConfigError(msg)) => {
            assert!(msg.contains("at can only contain startup or shutdown"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn handler_with_lifecycle_binding_is_rejected() {
    let file = write_config(
        r#"
[handler.hook]
command = "true"
at = ["startup"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(HookexecError::ConfigError(msg)) => {
            assert!(msg.contains("handler 'hook' cannot be bound"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn directory_pointing_at_a_file_is_rejected() {
    let not_a_dir = NamedTempFile::new().unwrap();
    let result = provision(&format!(
        r#"
[[command]]
command = "true"
directory = "{}"
"#,
        not_a_dir.path().display()
    ));

    match result {
        Err(HookexecError::ConfigError(msg)) => assert!(msg.contains("not a directory")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn invalid_toml_is_a_toml_error() {
    let file = write_config("[[command]\ncommand = ");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(HookexecError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        load_and_validate("/nonexistent/Hookexec.toml"),
        Err(HookexecError::IoError(_))
    ));
}
