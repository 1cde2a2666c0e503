//! # Enforcement Gate
//!
//! Decides, once per edit event, whether proposed code may be written.
//!
//! ```text
//!   mode disabled ───────────────────────────────────────────► Allow
//!   not an edit tool ────────────────────────────────────────► Allow
//!   extract candidates ── none ──────────────────────────────► Allow
//!          │
//!          ▼
//!   cache status ── all verified ──────────────── log ───────► Allow
//!          │
//!          ▼ unverified
//!   guidance ── strict ── log, bump blocked_edits ───────────► Block
//!            └─ warn ──── log, bump warned_edits ────────────► Warn
//! ```
//!
//! Only the cache and the logs are touched; nothing here fails the edit
//! because of a storage problem.

use std::path::Path;

use tracing::{debug, info};
use typegate_lexicon::{Dialect, TypeExtractor};
use typegate_store::{
    CacheStore, DataLayout, EnforcementOutcome, EventLog, SessionStore, VerificationStatus,
};

use crate::config::{EnforcementConfig, EnforcementMode, GateConfig, ToolCatalog};
use crate::decision::{Decision, Guidance};
use crate::events::{code_digest, EnforcementEvent, EnforcementEventKind, EventHeader};

/// A proposed edit.
#[derive(Debug, Clone, Copy)]
pub struct EditRequest<'a> {
    pub tool_name: &'a str,
    pub code: &'a str,
    pub file_path: Option<&'a Path>,
    pub session_id: &'a str,
}

/// Pre-edit decision function over the verification cache.
pub struct EnforcementGate {
    mode: EnforcementMode,
    settings: EnforcementConfig,
    catalog: ToolCatalog,
    extractor: TypeExtractor,
    cache: CacheStore,
    session: SessionStore,
    log: EventLog,
}

impl EnforcementGate {
    pub fn new(layout: &DataLayout, config: &GateConfig, mode: EnforcementMode) -> Self {
        Self {
            mode,
            settings: config.enforcement.clone(),
            catalog: config.tools.clone(),
            extractor: TypeExtractor::new(),
            cache: CacheStore::new(layout.cache_file())
                .with_ttl_days(config.cache.verification_ttl_days),
            session: SessionStore::new(layout.session_file()),
            log: EventLog::new(layout.enforcement_log(), config.logs.enforcement_cap),
        }
    }

    pub fn mode(&self) -> EnforcementMode {
        self.mode
    }

    pub fn is_edit_tool(&self, tool_name: &str) -> bool {
        self.settings.edit_tools.iter().any(|t| t == tool_name)
    }

    pub fn evaluate(&self, request: &EditRequest<'_>) -> Decision {
        if self.mode == EnforcementMode::Disabled {
            return Decision::allow();
        }
        if !self.is_edit_tool(request.tool_name) {
            return Decision::allow();
        }

        let candidates = self.extractor.extract(request.code, request.file_path);
        if candidates.is_empty() {
            debug!(tool = request.tool_name, "no type candidates");
            return Decision::allow();
        }

        let status = self.cache.status(&candidates, request.session_id);
        if status.all_verified() {
            debug!(verified = status.verified.len(), "all candidates verified");
            self.log_event(request, EnforcementEventKind::Allowed, &status, &[]);
            return Decision::allow();
        }

        let guidance = self.guidance(request, &status);
        match self.mode {
            EnforcementMode::Strict => {
                info!(unverified = ?status.unverified, "blocking edit");
                self.log_event(
                    request,
                    EnforcementEventKind::Blocked,
                    &status,
                    &guidance.suggested_tools,
                );
                self.session.record_enforcement(EnforcementOutcome::Blocked);
                Decision::block(guidance)
            }
            _ => {
                info!(unverified = ?status.unverified, "warning on edit");
                self.log_event(
                    request,
                    EnforcementEventKind::Warned,
                    &status,
                    &guidance.suggested_tools,
                );
                self.session.record_enforcement(EnforcementOutcome::Warned);
                Decision::warn(guidance)
            }
        }
    }

    fn guidance(&self, request: &EditRequest<'_>, status: &VerificationStatus) -> Guidance {
        let dialect = request.file_path.and_then(Dialect::from_path);

        let mut unverified = status.unverified.clone();
        unverified.sort();
        let omitted = unverified
            .len()
            .saturating_sub(self.settings.max_listed_names);
        unverified.truncate(self.settings.max_listed_names);

        let load = dialect.and_then(|d| {
            let state = self.session.load();
            if state.dialect(d).workspace_loaded {
                return None;
            }
            self.catalog
                .load_hint(d, &state.project_detection.get(d).manifests)
        });

        Guidance {
            file: request.file_path.map(|p| p.display().to_string()),
            dialect,
            unverified,
            omitted,
            suggested_tools: self
                .catalog
                .suggestions(dialect, self.settings.max_suggested_tools),
            load,
        }
    }

    fn log_event(
        &self,
        request: &EditRequest<'_>,
        event: EnforcementEventKind,
        status: &VerificationStatus,
        suggested_tools: &[String],
    ) {
        self.log.append(&EnforcementEvent {
            header: EventHeader::new(request.session_id),
            event,
            mode: self.mode,
            tool_name: request.tool_name.to_string(),
            file_path: request.file_path.map(|p| p.display().to_string()),
            code_sha256: code_digest(request.code),
            verified: status.verified.clone(),
            unverified: status.unverified.clone(),
            suggested_tools: suggested_tools.to_vec(),
        });
    }
}
