// src/command/cache.rs

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use tracing::debug;

use super::sink::{SharedWriter, SinkSpec};

/// Registry of open writers keyed by sink identity.
///
/// Commands that log to the same destination share one handle. Entries are
/// created lazily and live as long as the cache.
#[derive(Debug, Default)]
pub struct WriterCache {
    writers: Mutex<HashMap<String, SharedWriter>>,
}

impl WriterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached writer for `spec`, opening it on first use.
    pub fn resolve(&self, spec: &SinkSpec) -> io::Result<SharedWriter> {
        let key = spec.cache_key();
        let mut writers = self.writers.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(existing) = writers.get(&key) {
            debug!(sink = %key, "reusing cached writer");
            return Ok(existing.clone());
        }

        let writer = SharedWriter::new(key.as_str(), spec.open()?);
        debug!(sink = %key, "opened writer");
        writers.insert(key, writer.clone());
        Ok(writer)
    }

    pub fn len(&self) -> usize {
        self.writers.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
