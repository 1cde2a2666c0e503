//! # Session Bootstrap
//!
//! Runs once at session start: scans the workspace for project manifests,
//! replaces the session state with a fresh one, writes the guidance snapshot
//! shown to the agent and logs the start.
//!
//! | Dialect | Manifests |
//! |---------|-----------|
//! | C# | `*.sln`, `*.slnx`, `*.csproj` |
//! | TypeScript | `tsconfig.json`, `package.json` |

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Component, Path};

use tracing::{debug, info};
use typegate_lexicon::Dialect;
use typegate_store::{DataLayout, EventLog, ProjectDetection, SessionState, SessionStore};
use walkdir::{DirEntry, WalkDir};

use crate::config::{EnforcementMode, GateConfig, ScanConfig};
use crate::error::GateError;
use crate::events::{EventHeader, SessionEvent};

/// Result of a bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub state: SessionState,
    /// Human-readable summary, also written to the guidance snapshot.
    pub summary: String,
}

/// Finds manifest files under `workspace`.
///
/// Paths are workspace-relative with `/` separators, sorted per dialect.
pub fn detect_projects(workspace: &Path, scan: &ScanConfig) -> ProjectDetection {
    let skipped = |entry: &DirEntry| {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| scan.skip_dirs.iter().any(|s| s == name))
    };

    let mut detection = ProjectDetection::default();
    let walker = WalkDir::new(workspace)
        .max_depth(scan.max_depth)
        .into_iter()
        .filter_entry(|e| !skipped(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(dialect) = entry.file_name().to_str().and_then(Dialect::for_manifest) else {
            continue;
        };
        let Some(relative) = relative_slash_path(entry.path(), workspace) else {
            continue;
        };
        let found = detection.get_mut(dialect);
        found.detected = true;
        found.manifests.push(relative);
    }

    for dialect in Dialect::ALL {
        detection.get_mut(dialect).manifests.sort();
    }
    detection
}

fn relative_slash_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Session-start handler.
pub struct SessionBootstrap<'a> {
    layout: &'a DataLayout,
    config: &'a GateConfig,
}

impl<'a> SessionBootstrap<'a> {
    pub fn new(layout: &'a DataLayout, config: &'a GateConfig) -> Self {
        Self { layout, config }
    }

    pub fn run(
        &self,
        session_id: &str,
        source: Option<&str>,
        mode: EnforcementMode,
    ) -> Result<BootstrapReport, GateError> {
        let workspace = self.layout.workspace();
        let mut state = SessionState::new(session_id, workspace);
        state.project_detection = detect_projects(workspace, &self.config.scan);

        SessionStore::new(self.layout.session_file()).try_save(&mut state)?;

        let summary = self.summary(&state, mode);
        let guidance_file = self.layout.guidance_file();
        fs::write(&guidance_file, &summary).map_err(|e| GateError::io(&guidance_file, e))?;

        let detected: BTreeMap<String, Vec<String>> = Dialect::ALL
            .into_iter()
            .filter(|d| state.project_detection.get(*d).detected)
            .map(|d| {
                let manifests = state.project_detection.get(d).manifests.clone();
                (d.as_str().to_string(), manifests)
            })
            .collect();
        EventLog::new(self.layout.session_log(), self.config.logs.session_cap).append(
            &SessionEvent {
                header: EventHeader::new(session_id),
                event: "session_start",
                source: source.map(str::to_string),
                workspace: workspace.display().to_string(),
                detected,
            },
        );

        info!(session_id, mode = %mode, "session bootstrapped");
        Ok(BootstrapReport { state, summary })
    }

    fn summary(&self, state: &SessionState, mode: EnforcementMode) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "typegate: type verification is {} for this session.", mode);

        let mut any = false;
        for dialect in Dialect::ALL {
            let detection = state.project_detection.get(dialect);
            if !detection.detected {
                continue;
            }
            any = true;
            let _ = writeln!(
                out,
                "- {} project detected: {}",
                dialect,
                detection.manifests.join(", ")
            );
            if let Some(load) = self.config.tools.load_hint(dialect, &detection.manifests) {
                let _ = writeln!(out, "  load the workspace with {}", load);
            }
            let lookups: Vec<&str> = self
                .config
                .tools
                .lookup_tools(dialect)
                .map(|t| t.name.as_str())
                .collect();
            if !lookups.is_empty() {
                let _ = writeln!(out, "  verify types with {}", lookups.join(", "));
            }
        }
        if !any {
            let _ = writeln!(out, "- no C# or TypeScript project detected");
        }

        if mode == EnforcementMode::Strict {
            let _ = writeln!(
                out,
                "Edits that reference unverified types will be blocked until they are looked up."
            );
        }
        out
    }
}
