//! On-disk layout of a workspace's typegate directory.
//!
//! ```text
//! <workspace>/.typegate/
//! ├── config.json                 optional GateConfig
//! ├── data/
//! │   ├── verification_cache.json
//! │   ├── session_state.json
//! │   └── guidance.txt            written at session start
//! └── logs/
//!     ├── enforcement.json
//!     ├── verification.json
//!     └── session.json
//! ```

use std::path::{Path, PathBuf};

/// Name of the per-workspace state directory.
pub const STATE_DIR: &str = ".typegate";

/// Resolved paths for one workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    workspace: PathBuf,
    root: PathBuf,
}

impl DataLayout {
    pub fn for_workspace(workspace: impl Into<PathBuf>) -> Self {
        let workspace = workspace.into();
        let root = workspace.join(STATE_DIR);
        Self { workspace, root }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn cache_file(&self) -> PathBuf {
        self.data_dir().join("verification_cache.json")
    }

    pub fn session_file(&self) -> PathBuf {
        self.data_dir().join("session_state.json")
    }

    pub fn guidance_file(&self) -> PathBuf {
        self.data_dir().join("guidance.txt")
    }

    pub fn enforcement_log(&self) -> PathBuf {
        self.logs_dir().join("enforcement.json")
    }

    pub fn verification_log(&self) -> PathBuf {
        self.logs_dir().join("verification.json")
    }

    pub fn session_log(&self) -> PathBuf {
        self.logs_dir().join("session.json")
    }
}
