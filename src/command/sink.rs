// src/command/sink.rs

//! Output destinations for a command's stdout/stderr.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Deserialize;

/// Reference to a sink, as written in the config file.
///
/// ```toml
/// log = { output = "file", filename = "hooks.log" }
/// err_log = { output = "stderr" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "output", rename_all = "lowercase")]
pub enum SinkSpec {
    Stdout,
    Stderr,
    Discard,
    /// Appends to a file, creating it if needed.
    File { filename: PathBuf },
}

impl SinkSpec {
    /// Identity used by [`super::WriterCache`].
    pub fn cache_key(&self) -> String {
        match self {
            SinkSpec::Stdout => "stdout".to_string(),
            SinkSpec::Stderr => "stderr".to_string(),
            SinkSpec::Discard => "discard".to_string(),
            SinkSpec::File { filename } => format!("file:{}", filename.display()),
        }
    }

    pub(crate) fn open(&self) -> io::Result<Box<dyn Write + Send>> {
        match self {
            SinkSpec::Stdout => Ok(Box::new(io::stdout())),
            SinkSpec::Stderr => Ok(Box::new(io::stderr())),
            SinkSpec::Discard => Ok(Box::new(io::sink())),
            SinkSpec::File { filename } => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(filename)?;
                Ok(Box::new(file))
            }
        }
    }
}

impl Default for SinkSpec {
    fn default() -> Self {
        SinkSpec::Stderr
    }
}

/// Cloneable handle to one open writer.
///
/// Every clone writes through the same lock, so chunks from concurrent
/// commands never interleave mid-write.
#[derive(Clone)]
pub struct SharedWriter {
    key: Arc<str>,
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl SharedWriter {
    pub fn new(key: impl Into<Arc<str>>, writer: Box<dyn Write + Send>) -> Self {
        Self {
            key: key.into(),
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Write a whole chunk and flush it.
    pub fn write_chunk(&self, buf: &[u8]) -> io::Result<()> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.write_all(buf)?;
        guard.flush()
    }

    /// Whether both handles share the same underlying writer.
    pub fn same_writer(&self, other: &SharedWriter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SharedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedWriter")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
