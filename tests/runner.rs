// tests/runner.rs

#![cfg(unix)]

use std::error::Error;
use std::os::unix::process::ExitStatusExt;
use std::time::{Duration, Instant};

use hookexec::command::SinkSpec;
use hookexec::errors::RunError;
use hookexec::exec::{run, run_foreground, RunOutcome};
use hookexec_test_utils::builders::CommandConfigBuilder;
use hookexec_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn echo_writes_to_output_sink() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("out.log");

    let command = CommandConfigBuilder::new("echo")
        .arg("hi")
        .timeout("10s")
        .foreground(true)
        .log_file(&out)
        .provision();

    let outcome = with_timeout(run(&command, None)).await?;

    match outcome {
        RunOutcome::Exited(completion) => {
            assert!(completion.elapsed < Duration::from_secs(10));
            assert!(completion.status.success());
            assert_eq!(completion.command_line, vec!["echo", "hi"]);
        }
        other => panic!("expected foreground completion, got {other:?}"),
    }
    assert_eq!(std::fs::read(&out)?, b"hi\n");
    Ok(())
}

#[tokio::test]
async fn foreground_waits_for_exit() -> TestResult {
    init_tracing();
    let command = CommandConfigBuilder::new("sleep")
        .arg("0.3")
        .foreground(true)
        .log(SinkSpec::Discard)
        .provision();

    let started = Instant::now();
    with_timeout(run(&command, None)).await?;

    assert!(started.elapsed() >= Duration::from_millis(300));
    Ok(())
}

#[tokio::test]
async fn background_returns_before_exit() -> TestResult {
    init_tracing();
    let command = CommandConfigBuilder::new("sleep")
        .arg("1")
        .log(SinkSpec::Discard)
        .provision();

    let started = Instant::now();
    let outcome = with_timeout(run(&command, None)).await?;

    assert!(started.elapsed() < Duration::from_millis(800));
    assert!(matches!(outcome, RunOutcome::Spawned { pid: Some(_) }));
    Ok(())
}

#[tokio::test]
async fn hung_process_is_killed_at_deadline() -> TestResult {
    init_tracing();
    let command = CommandConfigBuilder::new("sleep")
        .arg("30")
        .timeout("200ms")
        .log(SinkSpec::Discard)
        .provision();

    let started = Instant::now();
    let result = with_timeout(run_foreground(&command, None)).await;
    let elapsed = started.elapsed();

    match result {
        Err(RunError::Exit { status, .. }) => assert_eq!(status.signal(), Some(9)),
        other => panic!("expected a killed process, got {other:?}"),
    }
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(3));
    Ok(())
}

#[tokio::test]
async fn fast_process_is_not_punished_by_timeout() -> TestResult {
    init_tracing();
    let command = CommandConfigBuilder::new("true")
        .timeout("5s")
        .log(SinkSpec::Discard)
        .provision();

    let completion = with_timeout(run_foreground(&command, None)).await?;

    assert!(completion.elapsed < Duration::from_secs(2));
    Ok(())
}

#[tokio::test]
async fn disabled_timeout_lets_process_finish() -> TestResult {
    init_tracing();
    let command = CommandConfigBuilder::new("sleep")
        .arg("0.2")
        .timeout("0")
        .log(SinkSpec::Discard)
        .provision();
    assert_eq!(command.timeout(), None);

    with_timeout(run_foreground(&command, None)).await?;
    Ok(())
}

#[tokio::test]
async fn descendant_holding_output_does_not_block_foreground() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("out.log");

    for timeout in ["500ms", "0"] {
        let command = CommandConfigBuilder::new("sh")
            .args(&["-c", "sleep 3 & echo started"])
            .timeout(timeout)
            .foreground(true)
            .log_file(&out)
            .provision();

        let started = Instant::now();
        let completion = with_timeout(run_foreground(&command, None)).await?;

        assert!(completion.status.success());
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "timeout {timeout}: took {:?}",
            started.elapsed()
        );
    }
    assert_eq!(std::fs::read_to_string(&out)?, "started\nstarted\n");
    Ok(())
}

#[tokio::test]
async fn missing_executable_is_a_start_error() {
    init_tracing();
    for foreground in [true, false] {
        let command = CommandConfigBuilder::new("/nonexistent/hookexec-test-binary")
            .foreground(foreground)
            .log(SinkSpec::Discard)
            .provision();

        let err = with_timeout(run(&command, None)).await.unwrap_err();
        assert!(matches!(err, RunError::Start { .. }), "got {err:?}");
    }
}

#[tokio::test]
async fn non_zero_exit_is_a_failure() {
    init_tracing();
    let command = CommandConfigBuilder::new("false")
        .log(SinkSpec::Discard)
        .provision();

    match with_timeout(run_foreground(&command, None)).await {
        Err(RunError::Exit { program, status }) => {
            assert_eq!(program, "false");
            assert_eq!(status.code(), Some(1));
        }
        other => panic!("expected exit failure, got {other:?}"),
    }
}

#[tokio::test]
async fn runs_in_configured_directory() -> TestResult {
    init_tracing();
    let workdir = tempfile::tempdir()?;
    let logs = tempfile::tempdir()?;
    let out = logs.path().join("pwd.log");

    let command = CommandConfigBuilder::new("pwd")
        .directory(workdir.path())
        .log_file(&out)
        .provision();

    with_timeout(run_foreground(&command, None)).await?;

    let printed = std::fs::read_to_string(&out)?;
    assert_eq!(
        std::fs::canonicalize(printed.trim())?,
        std::fs::canonicalize(workdir.path())?
    );
    Ok(())
}

#[tokio::test]
async fn empty_directory_inherits_current_dir() -> TestResult {
    init_tracing();
    let logs = tempfile::tempdir()?;
    let out = logs.path().join("pwd.log");

    let command = CommandConfigBuilder::new("pwd").log_file(&out).provision();
    assert!(command.directory().is_none());

    with_timeout(run_foreground(&command, None)).await?;

    let printed = std::fs::read_to_string(&out)?;
    assert_eq!(
        std::fs::canonicalize(printed.trim())?,
        std::fs::canonicalize(std::env::current_dir()?)?
    );
    Ok(())
}

#[tokio::test]
async fn argument_override_leaves_descriptor_untouched() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("out.log");

    let command = CommandConfigBuilder::new("echo")
        .arg("configured")
        .log_file(&out)
        .provision();

    with_timeout(run_foreground(&command, Some(vec!["override".to_string()]))).await?;

    assert_eq!(std::fs::read_to_string(&out)?, "override\n");
    assert_eq!(command.args(), ["configured".to_string()]);
    Ok(())
}

#[tokio::test]
async fn stderr_goes_to_error_sink() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("out.log");
    let err = dir.path().join("err.log");

    let command = CommandConfigBuilder::new("sh")
        .args(&["-c", "echo to-stdout; echo to-stderr >&2"])
        .log_file(&out)
        .err_log(SinkSpec::File {
            filename: err.clone(),
        })
        .provision();

    with_timeout(run_foreground(&command, None)).await?;

    assert_eq!(std::fs::read_to_string(&out)?, "to-stdout\n");
    assert_eq!(std::fs::read_to_string(&err)?, "to-stderr\n");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_invocations_share_one_descriptor() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("out.log");

    let command = std::sync::Arc::new(
        CommandConfigBuilder::new("echo")
            .arg("base")
            .log_file(&out)
            .provision(),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let command = std::sync::Arc::clone(&command);
            tokio::spawn(async move {
                run_foreground(&command, Some(vec![format!("run-{i}")])).await
            })
        })
        .collect();
    for handle in handles {
        with_timeout(handle).await??;
    }

    let contents = std::fs::read_to_string(&out)?;
    let mut lines: Vec<_> = contents.lines().collect();
    lines.sort_unstable();
    let expected: Vec<String> = (0..8).map(|i| format!("run-{i}")).collect();
    let mut expected: Vec<&str> = expected.iter().map(String::as_str).collect();
    expected.sort_unstable();
    assert_eq!(lines, expected);
    assert_eq!(command.args(), ["base".to_string()]);
    Ok(())
}
