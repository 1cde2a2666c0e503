//! Session bookkeeping after a successful verification-tool call.

use std::fmt::Write as _;

use serde_json::Value;
use tracing::debug;
use typegate_lexicon::Dialect;
use typegate_store::{DataLayout, EventLog, SessionStore, VerificationRecord};

use crate::config::{GateConfig, ToolAction, ToolCatalog};
use crate::events::{EventHeader, VerificationEvent};

/// Request keys that name the loaded solution or project.
const LOAD_PATH_KEYS: &[&str] = &["solutionPath", "projectPath", "filePath"];

/// Properties and methods shown per verified type.
const FEEDBACK_PROPERTIES: usize = 3;
const FEEDBACK_METHODS: usize = 2;

/// What one tracked call changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracked {
    pub dialect: Dialect,
    pub action: ToolAction,
    /// Manifest passed to a load tool.
    pub loaded_path: Option<String>,
    /// Distinct names verified for the dialect this session.
    pub verified_names: usize,
    pub total_verifications: u64,
}

impl Tracked {
    /// Agent-facing confirmation, or `None` when there is nothing to report.
    ///
    /// `records` are the cache records written by the same call.
    pub fn feedback(&self, records: &[VerificationRecord]) -> Option<String> {
        let mut out = String::new();
        match self.action {
            ToolAction::Load => match &self.loaded_path {
                Some(path) => {
                    let _ = writeln!(out, "{} workspace loaded: {}", self.dialect, path);
                }
                None => {
                    let _ = writeln!(out, "{} workspace loaded.", self.dialect);
                }
            },
            ToolAction::Lookup => {
                if records.is_empty() {
                    return None;
                }
                for record in records {
                    let _ = writeln!(out, "Type verified: {} ({})", record.name, record.kind.as_str());
                    write_members(&mut out, "properties", &record.properties, FEEDBACK_PROPERTIES);
                    write_members(&mut out, "methods", &record.methods, FEEDBACK_METHODS);
                }
                let _ = writeln!(
                    out,
                    "{} types verified this session: {}",
                    self.dialect, self.verified_names
                );
            }
        }
        Some(out)
    }
}

fn write_members(out: &mut String, label: &str, names: &[String], limit: usize) {
    if names.is_empty() {
        return;
    }
    let shown: Vec<&str> = names.iter().take(limit).map(String::as_str).collect();
    let _ = write!(out, "  {}: {}", label, shown.join(", "));
    if names.len() > limit {
        let _ = write!(out, " (+{} more)", names.len() - limit);
    }
    out.push('\n');
}

/// Updates session state for verification-tool calls.
pub struct SessionTracker {
    catalog: ToolCatalog,
    session: SessionStore,
    log: EventLog,
}

impl SessionTracker {
    pub fn new(layout: &DataLayout, config: &GateConfig) -> Self {
        Self {
            catalog: config.tools.clone(),
            session: SessionStore::new(layout.session_file()),
            log: EventLog::new(layout.verification_log(), config.logs.verification_cap),
        }
    }

    /// Applies one call; returns `None` for tools outside the catalog.
    ///
    /// `recorded` are the names the cache builder stored for this call.
    pub fn track(
        &self,
        tool_name: &str,
        request: &Value,
        recorded: &[String],
        session_id: &str,
    ) -> Option<Tracked> {
        let tool = self.catalog.find(tool_name)?;

        let mut loaded_path = None;
        match tool.action {
            ToolAction::Load => {
                let path = LOAD_PATH_KEYS
                    .iter()
                    .filter_map(|key| request.get(*key).and_then(Value::as_str))
                    .find(|p| !p.is_empty());
                self.session
                    .mark_workspace_loaded(tool.dialect, path.unwrap_or_default());
                loaded_path = path.map(str::to_string);
            }
            ToolAction::Lookup => {
                for name in recorded {
                    self.session.record_verified_name(tool.dialect, name);
                }
            }
        }
        let total = self.session.increment_verification_count();
        debug!(tool = tool_name, total, "tracked verification call");

        self.log.append(&VerificationEvent {
            header: EventHeader::new(session_id),
            tool_name: tool_name.to_string(),
            dialect: tool.dialect.as_str().to_string(),
            action: match tool.action {
                ToolAction::Load => "load".to_string(),
                ToolAction::Lookup => "lookup".to_string(),
            },
            recorded_types: recorded.to_vec(),
            total_verifications: total,
        });

        let verified_names = self
            .session
            .load()
            .dialect(tool.dialect)
            .verified_type_names
            .len();
        Some(Tracked {
            dialect: tool.dialect,
            action: tool.action,
            loaded_path,
            verified_names,
            total_verifications: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use typegate_lexicon::TypeKind;
    use typegate_store::{CacheStore, TypeInfo};

    #[test]
    fn test_load_tool_marks_workspace() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::for_workspace(dir.path());
        let tracker = SessionTracker::new(&layout, &GateConfig::default());

        let tracked = tracker
            .track(
                "mcp__codenav__csharp_load_solution",
                &json!({"solutionPath": "/src/App.sln"}),
                &[],
                "s1",
            )
            .unwrap();
        assert_eq!(
            tracked.feedback(&[]).as_deref(),
            Some("C# workspace loaded: /src/App.sln\n")
        );

        let state = SessionStore::new(layout.session_file()).load();
        assert!(state.dialect(Dialect::CSharp).workspace_loaded);
        assert_eq!(state.csharp.loaded_path.as_deref(), Some("/src/App.sln"));
        assert_eq!(state.statistics.total_verifications, 1);
    }

    #[test]
    fn test_lookup_records_names_once() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::for_workspace(dir.path());
        let tracker = SessionTracker::new(&layout, &GateConfig::default());
        let names = vec!["Order".to_string()];

        tracker.track("mcp__codenav__ts_hover", &json!({}), &names, "s1");
        tracker.track("mcp__codenav__ts_goto_definition", &json!({}), &names, "s1");

        let state = SessionStore::new(layout.session_file()).load();
        assert_eq!(state.typescript.verified_type_names, vec!["Order"]);
        assert_eq!(state.statistics.total_verifications, 2);
        assert_eq!(EventLog::new(layout.verification_log(), 500).entries().len(), 2);
    }

    #[test]
    fn test_project_load_marks_csharp_workspace() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::for_workspace(dir.path());
        let tracker = SessionTracker::new(&layout, &GateConfig::default());

        assert!(tracker
            .track(
                "mcp__codenav__csharp_load_project",
                &json!({"projectPath": "src/Api/Api.csproj"}),
                &[],
                "s1",
            )
            .is_some());
        let state = SessionStore::new(layout.session_file()).load();
        assert!(state.csharp.workspace_loaded);
        assert_eq!(state.csharp.loaded_path.as_deref(), Some("src/Api/Api.csproj"));
    }

    #[test]
    fn test_unknown_tool_ignored() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::for_workspace(dir.path());
        let tracker = SessionTracker::new(&layout, &GateConfig::default());
        assert!(tracker.track("Bash", &json!({}), &[], "s1").is_none());
        assert!(!layout.session_file().exists());
    }

    #[test]
    fn test_lookup_feedback_lists_members() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::for_workspace(dir.path());
        let tracker = SessionTracker::new(&layout, &GateConfig::default());

        let mut info = TypeInfo::new(TypeKind::Class);
        for property in ["Id", "Name", "Email", "Phone"] {
            info.add_property(property);
        }
        for method in ["Save", "Delete"] {
            info.add_method(method);
        }
        let record = CacheStore::new(layout.cache_file())
            .record("User", info, "s1")
            .unwrap();

        let tracked = tracker
            .track("mcp__codenav__csharp_hover", &json!({}), &["User".to_string()], "s1")
            .unwrap();
        let text = tracked.feedback(&[record]).unwrap();
        assert_eq!(
            text,
            "Type verified: User (class)\n\
             \x20 properties: Id, Name, Email (+1 more)\n\
             \x20 methods: Save, Delete\n\
             C# types verified this session: 1\n"
        );
    }

    #[test]
    fn test_lookup_without_records_has_no_feedback() {
        let dir = TempDir::new().unwrap();
        let layout = DataLayout::for_workspace(dir.path());
        let tracker = SessionTracker::new(&layout, &GateConfig::default());
        let tracked = tracker
            .track("mcp__codenav__ts_hover", &json!({}), &[], "s1")
            .unwrap();
        assert!(tracked.feedback(&[]).is_none());
    }
}
