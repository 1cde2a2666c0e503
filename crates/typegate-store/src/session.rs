//! # Session State
//!
//! Per-workspace record of what the current agent session has done: which
//! projects were detected at start, which language workspaces have been
//! loaded into a verification tool, which names were looked up, and a few
//! counters.
//!
//! Decoding is tolerant field by field. Any key that is missing or has the
//! wrong type falls back to its default while the rest of the document is
//! kept, so a partially corrupt file never loses more than the bad fields.

use crate::document::{read_document, write_document};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use typegate_lexicon::Dialect;

/// Decodes a field, substituting the default when the value has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Manifest detection for one dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(default, deserialize_with = "lenient")]
    pub detected: bool,
    /// Workspace-relative manifest paths, `/`-separated and sorted.
    #[serde(default, deserialize_with = "lenient")]
    pub manifests: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDetection {
    #[serde(default, deserialize_with = "lenient")]
    pub csharp: Detection,
    #[serde(default, deserialize_with = "lenient")]
    pub typescript: Detection,
}

impl ProjectDetection {
    pub fn get(&self, dialect: Dialect) -> &Detection {
        match dialect {
            Dialect::CSharp => &self.csharp,
            Dialect::TypeScript => &self.typescript,
        }
    }

    pub fn get_mut(&mut self, dialect: Dialect) -> &mut Detection {
        match dialect {
            Dialect::CSharp => &mut self.csharp,
            Dialect::TypeScript => &mut self.typescript,
        }
    }
}

/// Verification progress for one dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectSession {
    #[serde(default, deserialize_with = "lenient")]
    pub workspace_loaded: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub loaded_path: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub verified_type_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default, deserialize_with = "lenient")]
    pub total_verifications: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub session_start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub blocked_edits: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub warned_edits: u64,
}

/// The whole session document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default, deserialize_with = "lenient")]
    pub session_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient")]
    pub workspace_path: PathBuf,
    #[serde(default, deserialize_with = "lenient")]
    pub project_detection: ProjectDetection,
    #[serde(default, deserialize_with = "lenient")]
    pub csharp: DialectSession,
    #[serde(default, deserialize_with = "lenient")]
    pub typescript: DialectSession,
    #[serde(default, deserialize_with = "lenient")]
    pub statistics: Statistics,
    #[serde(default, deserialize_with = "lenient")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl SessionState {
    /// A fresh state for a session starting now.
    pub fn new(session_id: impl Into<String>, workspace_path: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            created_at: Some(now),
            workspace_path: workspace_path.into(),
            statistics: Statistics {
                session_start: Some(now),
                ..Statistics::default()
            },
            ..Self::default()
        }
    }

    /// Decodes any JSON value; non-objects yield the default state.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn dialect(&self, dialect: Dialect) -> &DialectSession {
        match dialect {
            Dialect::CSharp => &self.csharp,
            Dialect::TypeScript => &self.typescript,
        }
    }

    pub fn dialect_mut(&mut self, dialect: Dialect) -> &mut DialectSession {
        match dialect {
            Dialect::CSharp => &mut self.csharp,
            Dialect::TypeScript => &mut self.typescript,
        }
    }
}

/// Which counter an enforcement decision bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcementOutcome {
    Blocked,
    Warned,
}

/// File-backed session state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the state, reporting unreadable or unparseable documents.
    pub fn try_load(&self) -> Result<SessionState> {
        let value: Option<Value> = read_document(&self.path)?;
        Ok(value.map(SessionState::from_value).unwrap_or_default())
    }

    /// Loads the state, falling back to defaults on any failure.
    pub fn load(&self) -> SessionState {
        self.try_load().unwrap_or_else(|e| {
            debug!(error = %e, "session state unreadable, using defaults");
            SessionState::default()
        })
    }

    /// Stamps `last_updated` and writes the state.
    pub fn try_save(&self, state: &mut SessionState) -> Result<()> {
        state.last_updated = Some(Utc::now());
        write_document(&self.path, state)
    }

    /// Like [`try_save`](Self::try_save) but logs and drops failures.
    pub fn save(&self, state: &mut SessionState) {
        if let Err(e) = self.try_save(state) {
            warn!(error = %e, path = %self.path.display(), "failed to save session state");
        }
    }

    /// Load, apply `f`, save.
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.load();
        let out = f(&mut state);
        self.save(&mut state);
        out
    }

    pub fn mark_workspace_loaded(&self, dialect: Dialect, path: &str) {
        self.update(|state| {
            let section = state.dialect_mut(dialect);
            section.workspace_loaded = true;
            section.loaded_path = Some(path.to_string()).filter(|p| !p.is_empty());
        });
        debug!(dialect = dialect.as_str(), path, "workspace loaded");
    }

    /// Adds `name` to the dialect's verified list; returns false if it was already there.
    pub fn record_verified_name(&self, dialect: Dialect, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        self.update(|state| {
            let names = &mut state.dialect_mut(dialect).verified_type_names;
            if names.iter().any(|n| n == name) {
                false
            } else {
                names.push(name.to_string());
                true
            }
        })
    }

    /// Bumps the verification counter and returns the new total.
    pub fn increment_verification_count(&self) -> u64 {
        self.update(|state| {
            state.statistics.total_verifications += 1;
            state.statistics.total_verifications
        })
    }

    pub fn record_enforcement(&self, outcome: EnforcementOutcome) {
        self.update(|state| match outcome {
            EnforcementOutcome::Blocked => state.statistics.blocked_edits += 1,
            EnforcementOutcome::Warned => state.statistics.warned_edits += 1,
        });
    }
}
