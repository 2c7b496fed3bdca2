// src/exec/deadline.rs

//! Per-invocation timeout watcher.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Fires once `timeout` elapses, unless defused first.
///
/// The watcher task races the timer against a done signal. Dropping the
/// `Deadline` (or calling [`Deadline::defuse`]) closes that signal, so the
/// watcher always terminates even when the timer never fires.
#[derive(Debug)]
pub struct Deadline {
    expired: oneshot::Receiver<()>,
    done: Option<oneshot::Sender<()>>,
    watcher: JoinHandle<()>,
}

impl Deadline {
    pub fn start(timeout: Duration) -> Self {
        let (expired_tx, expired_rx) = oneshot::channel::<()>();
        let (done_tx, done_rx) = oneshot::channel::<()>();

        let watcher = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => {
                    let _ = expired_tx.send(());
                }
                _ = done_rx => {}
            }
        });

        Self {
            expired: expired_rx,
            done: Some(done_tx),
            watcher,
        }
    }

    /// Resolves when the deadline has passed.
    ///
    /// Never resolves if the watcher went away without firing.
    pub async fn expired(&mut self) {
        if (&mut self.expired).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Stop the timer and return the watcher so callers can join it.
    pub fn defuse(mut self) -> JoinHandle<()> {
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
        self.watcher
    }
}
