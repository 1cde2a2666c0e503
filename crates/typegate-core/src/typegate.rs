//! The typegate facade.
//!
//! One [`Typegate`] is built per hook invocation from the workspace the
//! event belongs to. Each method handles one host event end to end.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use typegate_lexicon::Dialect;
use typegate_store::{CacheStore, DataLayout, SessionState, SessionStore, VerificationRecord};

use crate::bootstrap::{BootstrapReport, SessionBootstrap};
use crate::builder::CacheBuilder;
use crate::config::{EnforcementMode, GateConfig, ToolAction};
use crate::decision::Decision;
use crate::error::GateError;
use crate::gate::{EditRequest, EnforcementGate};
use crate::hook::HookInput;
use crate::tracker::SessionTracker;

/// What a post-tool event did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostToolReport {
    /// Names written to the cache.
    pub recorded: Vec<String>,
    /// The call was a catalogued verification tool.
    pub tracked: bool,
    /// Confirmation for the agent: verified types or the loaded workspace.
    pub feedback: Option<String>,
}

/// Snapshot printed by `typegate status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub workspace: PathBuf,
    pub mode: EnforcementMode,
    pub cache_session_id: String,
    pub cached_types: Vec<String>,
    pub valid_types: Vec<String>,
    pub session: SessionState,
}

/// Entry point for every hook event in one workspace.
pub struct Typegate {
    layout: DataLayout,
    config: GateConfig,
}

impl Typegate {
    /// Opens a workspace, reading its optional config file.
    pub fn open(workspace: impl Into<PathBuf>) -> Self {
        let layout = DataLayout::for_workspace(workspace);
        let config = GateConfig::load_or_default(&layout);
        Self { layout, config }
    }

    pub fn with_config(workspace: impl Into<PathBuf>, config: GateConfig) -> Self {
        Self {
            layout: DataLayout::for_workspace(workspace),
            config,
        }
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    fn cache(&self) -> CacheStore {
        CacheStore::new(self.layout.cache_file())
            .with_ttl_days(self.config.cache.verification_ttl_days)
    }

    /// Session start: bootstrap the session state.
    pub fn session_start(
        &self,
        input: &HookInput,
        mode: EnforcementMode,
    ) -> Result<BootstrapReport, GateError> {
        SessionBootstrap::new(&self.layout, &self.config).run(
            &input.session_id,
            input.source.as_deref(),
            mode,
        )
    }

    /// Pre-edit: run the enforcement gate.
    pub fn pre_edit(&self, input: &HookInput, mode: EnforcementMode) -> Decision {
        let code = input.edit_text();
        let file_path = input.file_path();
        let gate = EnforcementGate::new(&self.layout, &self.config, mode);
        gate.evaluate(&EditRequest {
            tool_name: &input.tool_name,
            code: &code,
            file_path: file_path.as_deref(),
            session_id: &input.session_id,
        })
    }

    /// Post-tool: ingest verification results and source-file reads.
    pub fn post_tool(&self, input: &HookInput) -> Result<PostToolReport, GateError> {
        if !input.is_successful_response() {
            debug!(tool = %input.tool_name, "no successful response, nothing to ingest");
            return Ok(PostToolReport::default());
        }
        let builder = CacheBuilder::new(self.cache(), self.layout.workspace());

        if self.config.tools.is_read_tool(&input.tool_name) {
            let Some(path) = input.file_path() else {
                return Ok(PostToolReport::default());
            };
            if Dialect::from_path(&path).is_none() {
                return Ok(PostToolReport::default());
            }
            let absolute = self.resolve(&path);
            let text = fs::read_to_string(&absolute).map_err(|e| GateError::io(&absolute, e))?;
            let recorded = builder.ingest_file(&absolute, &text, &input.session_id);
            return Ok(PostToolReport {
                recorded,
                ..PostToolReport::default()
            });
        }

        let Some(tool) = self.config.tools.find(&input.tool_name) else {
            return Ok(PostToolReport::default());
        };
        let recorded = match (&input.tool_response, tool.action) {
            (Some(response), ToolAction::Lookup) => builder.ingest_lookup(
                response,
                &input.tool_input,
                Some(tool.dialect),
                &input.session_id,
            ),
            _ => Vec::new(),
        };
        let tracked = SessionTracker::new(&self.layout, &self.config).track(
            &input.tool_name,
            &input.tool_input,
            &recorded,
            &input.session_id,
        );
        let feedback = tracked.as_ref().and_then(|tracked| {
            let cache = builder.cache().load();
            let records: Vec<VerificationRecord> = recorded
                .iter()
                .filter_map(|name| cache.get(name).cloned())
                .collect();
            tracked.feedback(&records)
        });
        Ok(PostToolReport {
            recorded,
            tracked: tracked.is_some(),
            feedback,
        })
    }

    /// Current cache and session contents.
    pub fn status(&self, mode: EnforcementMode) -> Result<StatusReport, GateError> {
        let cache_store = self.cache();
        let cache = cache_store.try_load()?;
        let session = SessionStore::new(self.layout.session_file()).try_load()?;
        let valid_types = cache
            .verified_types
            .values()
            .filter(|record| cache_store.is_valid(record))
            .map(|record| record.name.clone())
            .collect();
        Ok(StatusReport {
            workspace: self.layout.workspace().to_path_buf(),
            mode,
            cache_session_id: cache.session_id.clone(),
            cached_types: cache.verified_types.keys().cloned().collect(),
            valid_types,
            session,
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.layout.workspace().join(path)
        }
    }
}
