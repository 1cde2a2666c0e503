//! Whole-file JSON documents.
//!
//! Every store is one JSON file that is read completely, mutated in memory
//! and rewritten completely. There is no locking and no atomic rename: two
//! hook processes racing on the same file can lose an update, and a crash
//! mid-write leaves a file that the next load treats as absent.

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Reads and decodes `path`. A missing file is `Ok(None)`.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}

/// Encodes `value` as pretty JSON and overwrites `path`, creating parent directories.
pub fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    let encoded = serde_json::to_string_pretty(value)?;
    fs::write(path, encoded).map_err(|e| StoreError::io(path, e))
}
