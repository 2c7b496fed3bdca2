// src/exec/output.rs

//! Copies child output into sinks.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::command::SharedWriter;

/// How long pumps may keep draining after the process exited on its own.
///
/// A process can exit while a descendant still holds its stdout or stderr,
/// e.g. `sh -c "server &"`. The invocation must not wait on that descendant.
pub const EXIT_DRAIN_GRACE: Duration = Duration::from_millis(200);

/// How long pumps may keep draining after the process was killed.
pub const KILLED_DRAIN_GRACE: Duration = Duration::from_millis(200);

/// What happens to a pump still running when its grace period ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Straggler {
    /// Stop copying; the rest of the stream is dropped.
    Abort,
    /// Keep copying in the background until the pipe closes.
    Detach,
}

/// Spawn a task that drains `reader` into `sink` until EOF.
///
/// Write failures are logged once and the rest of the stream is discarded, so
/// the child never blocks on a full pipe.
pub fn spawn_pump<R>(reader: R, sink: SharedWriter, stream: &'static str) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = reader;
        let mut buf = vec![0u8; 8 * 1024];
        let mut sink_ok = true;

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    debug!(stream, error = %e, "reading child output failed");
                    break;
                }
            };

            if sink_ok {
                if let Err(e) = write_blocking(&sink, &buf[..n]).await {
                    warn!(
                        stream,
                        sink = sink.key(),
                        error = %e,
                        "writing to sink failed; discarding output"
                    );
                    sink_ok = false;
                }
            }
        }
    })
}

/// Sinks are std writers, so the write runs on the blocking pool.
async fn write_blocking(sink: &SharedWriter, chunk: &[u8]) -> io::Result<()> {
    let sink = sink.clone();
    let chunk = chunk.to_vec();
    tokio::task::spawn_blocking(move || sink.write_chunk(&chunk))
        .await
        .map_err(io::Error::other)?
}

/// Join every pump within one shared `grace` window.
///
/// Pumps still running when the window closes are handled per `straggler`.
pub async fn join_pumps(pumps: Vec<JoinHandle<()>>, grace: Duration, straggler: Straggler) {
    let until = Instant::now() + grace;
    for mut pump in pumps {
        if tokio::time::timeout_at(until, &mut pump).await.is_ok() {
            continue;
        }
        match straggler {
            Straggler::Abort => {
                debug!("output still open after kill; abandoning pump");
                pump.abort();
            }
            Straggler::Detach => {
                debug!("output held open by a descendant; detaching pump");
            }
        }
    }
}
