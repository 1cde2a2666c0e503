//! # Verification Cache
//!
//! Durable mapping from type name to [`VerificationRecord`], scoped to one
//! agent session and subject to a staleness policy.
//!
//! ## Session binding
//!
//! The document carries the `session_id` it was written under. A reader from
//! a different session treats the mapping as empty; the previous generation
//! stays on disk until the first write under the new session replaces it.
//!
//! ## Staleness
//!
//! | Record | Valid when |
//! |--------|-----------|
//! | has `source_file` | file exists, `file_mtime` cached, current mtime ≤ cached |
//! | no `source_file` | verified less than the TTL ago (7 days by default) |
//!
//! A filesystem error other than "not found" while checking a sourced record
//! falls back to the TTL rule.

use crate::document::{read_document, write_document};
use crate::error::Result;
use crate::models::{TypeInfo, VerificationCache, VerificationRecord, VerificationStatus};
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Default lifetime of a record with no source file.
pub const DEFAULT_TTL_DAYS: i64 = 7;

/// File-backed verification cache.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
    ttl: Duration,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: Duration::days(DEFAULT_TTL_DAYS),
        }
    }

    /// Overrides the lifetime of records that have no source file.
    pub fn with_ttl_days(mut self, days: i64) -> Self {
        self.ttl = Duration::days(days);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Loads the cache, reporting unreadable or malformed documents.
    ///
    /// A missing file yields an empty cache bound to `""`.
    pub fn try_load(&self) -> Result<VerificationCache> {
        Ok(read_document(&self.path)?.unwrap_or_default())
    }

    /// Loads the cache, treating any failure as an empty cache bound to `""`.
    pub fn load(&self) -> VerificationCache {
        self.try_load().unwrap_or_else(|e| {
            debug!(error = %e, "verification cache unreadable, starting empty");
            VerificationCache::default()
        })
    }

    pub fn try_save(&self, cache: &VerificationCache) -> Result<()> {
        write_document(&self.path, cache)
    }

    /// Persists the cache; failures are logged and dropped.
    pub fn save(&self, cache: &VerificationCache) {
        if let Err(e) = self.try_save(cache) {
            warn!(error = %e, path = %self.path.display(), "failed to save verification cache");
        }
    }

    /// Upserts a record for `name` under `session_id` and persists.
    ///
    /// Returns the stored record, or `None` when `name` is empty.
    pub fn record(
        &self,
        name: &str,
        info: TypeInfo,
        session_id: &str,
    ) -> Option<VerificationRecord> {
        if name.is_empty() {
            return None;
        }

        let now = Utc::now();
        let file_mtime = info.source_file.as_deref().map(|path| {
            mtime_secs(path).unwrap_or_else(|e| {
                debug!(error = %e, path = %path.display(), "stat failed, using current time");
                epoch_secs(now)
            })
        });

        let record = VerificationRecord {
            name: name.to_string(),
            kind: info.kind,
            signature: info.signature,
            documentation: info.documentation,
            properties: info.properties,
            methods: info.methods,
            verified_at: now,
            source_file: info.source_file,
            file_mtime,
        };

        let mut cache = self.load();
        if !cache.is_bound_to(session_id) {
            debug!(from = %cache.session_id, to = %session_id, "session changed, resetting cache");
            cache.reset(session_id);
        }
        cache
            .verified_types
            .insert(record.name.clone(), record.clone());
        self.save(&cache);

        debug!(name = %record.name, kind = record.kind.as_str(), "recorded verification");
        Some(record)
    }

    /// Staleness check against the current time.
    pub fn is_valid(&self, record: &VerificationRecord) -> bool {
        self.is_valid_at(record, Utc::now())
    }

    /// Staleness check against an explicit clock.
    pub fn is_valid_at(&self, record: &VerificationRecord, now: DateTime<Utc>) -> bool {
        let Some(source) = record.source_file.as_deref() else {
            return self.within_ttl(record, now);
        };

        let current = match mtime_secs(source) {
            Ok(current) => current,
            Err(e) if e.kind() == ErrorKind::NotFound => return false,
            Err(e) => {
                debug!(error = %e, path = %source.display(), "stat failed, using time rule");
                return self.within_ttl(record, now);
            }
        };

        match record.file_mtime {
            Some(cached) => current <= cached,
            None => false,
        }
    }

    fn within_ttl(&self, record: &VerificationRecord, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(record.verified_at) < self.ttl
    }

    /// Partitions `names` into verified and unverified for `session_id`.
    ///
    /// A cache bound to another session is reset and persisted first, so
    /// every name is unverified in that case.
    pub fn status<I, S>(&self, names: I, session_id: &str) -> VerificationStatus
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cache = self.load();
        if !cache.is_bound_to(session_id) {
            debug!(from = %cache.session_id, to = %session_id, "session changed, resetting cache");
            cache.reset(session_id);
            self.save(&cache);
        }

        let now = Utc::now();
        let mut status = VerificationStatus::default();
        for name in names {
            let name = name.as_ref();
            let valid = cache
                .get(name)
                .is_some_and(|record| self.is_valid_at(record, now));
            if valid {
                status.verified.push(name.to_string());
            } else {
                status.unverified.push(name.to_string());
            }
        }
        status
    }
}

/// Modification time of `path` in seconds since the Unix epoch.
pub fn mtime_secs(path: &Path) -> io::Result<f64> {
    let modified = fs::metadata(path)?.modified()?;
    system_time_secs(modified)
}

fn system_time_secs(time: SystemTime) -> io::Result<f64> {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
}

fn epoch_secs(time: DateTime<Utc>) -> f64 {
    time.timestamp_micros() as f64 / 1_000_000.0
}
