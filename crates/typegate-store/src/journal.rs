//! Bounded JSON event logs.
//!
//! Each log is a single JSON array. Appending rewrites the array and evicts
//! the oldest entries once it grows past its cap, so a log never holds more
//! than `cap` events no matter how long the workspace is used.

use crate::document::{read_document, write_document};
use crate::error::Result;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Capped append-only log backed by one JSON array file.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
    cap: usize,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>, cap: usize) -> Self {
        Self {
            path: path.into(),
            cap,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Current entries, oldest first. Unreadable logs are empty.
    pub fn entries(&self) -> Vec<Value> {
        match read_document::<Value>(&self.path) {
            Ok(Some(Value::Array(entries))) => entries,
            _ => Vec::new(),
        }
    }

    /// Appends `entry`, dropping the oldest entries beyond the cap.
    pub fn try_append<T: Serialize>(&self, entry: &T) -> Result<()> {
        let mut entries = self.entries();
        entries.push(serde_json::to_value(entry)?);
        if entries.len() > self.cap {
            let excess = entries.len() - self.cap;
            entries.drain(..excess);
        }
        write_document(&self.path, &entries)
    }

    /// Like [`try_append`](Self::try_append) but logs and drops failures.
    pub fn append<T: Serialize>(&self, entry: &T) {
        if let Err(e) = self.try_append(entry) {
            warn!(error = %e, path = %self.path.display(), "failed to append event");
        }
    }
}
