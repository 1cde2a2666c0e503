//! Configuration types for typegate.
//!
//! Loaded from the optional `<workspace>/.typegate/config.json`. Every
//! section and every field has a default, so a partial file only overrides
//! what it names.

use crate::decision::LoadHint;
use crate::error::GateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use typegate_lexicon::Dialect;
use typegate_store::document::read_document;
use typegate_store::{DataLayout, DEFAULT_TTL_DAYS};

/// Environment variable that overrides the configured enforcement mode.
pub const MODE_ENV_VAR: &str = "TYPEGATE_ENFORCEMENT";

/// How the gate reacts to unverified type references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementMode {
    /// Never extract, always allow.
    Disabled,
    /// Always allow, emit guidance as a warning.
    Warn,
    /// Block edits that reference unverified types.
    #[default]
    Strict,
}

impl EnforcementMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EnforcementMode::Disabled => "disabled",
            EnforcementMode::Warn => "warn",
            EnforcementMode::Strict => "strict",
        }
    }
}

impl fmt::Display for EnforcementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnforcementMode {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(EnforcementMode::Strict),
            "warn" => Ok(EnforcementMode::Warn),
            "disabled" => Ok(EnforcementMode::Disabled),
            _ => Err(GateError::InvalidMode(s.to_string())),
        }
    }
}

/// What a verification tool does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolAction {
    /// Loads a solution or project into the language service.
    Load,
    /// Reports type information for a symbol.
    Lookup,
}

/// One entry of the verification tool catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationTool {
    pub name: String,
    pub dialect: Dialect,
    pub action: ToolAction,
    /// Request key that takes the manifest path, for load tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<String>,
    /// Manifest file-name suffixes a load tool accepts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manifests: Vec<String>,
}

impl VerificationTool {
    fn lookup(name: &str, dialect: Dialect) -> Self {
        Self {
            name: name.to_string(),
            dialect,
            action: ToolAction::Lookup,
            argument: None,
            manifests: Vec::new(),
        }
    }

    fn load(name: &str, dialect: Dialect, argument: &str, manifests: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            dialect,
            action: ToolAction::Load,
            argument: Some(argument.to_string()),
            manifests: manifests.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// True when `path` names a manifest this load tool accepts.
    pub fn accepts(&self, path: &str) -> bool {
        self.manifests.iter().any(|suffix| path.ends_with(suffix.as_str()))
    }
}

/// Known verification and file-read tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolCatalog {
    /// Tools whose results are scanned as whole source files.
    pub read_tools: Vec<String>,
    /// Language-service tools, in suggestion order per dialect.
    pub verification: Vec<VerificationTool>,
}

impl Default for ToolCatalog {
    fn default() -> Self {
        use Dialect::{CSharp, TypeScript};
        Self {
            read_tools: vec!["Read".to_string()],
            verification: vec![
                VerificationTool::load(
                    "mcp__codenav__csharp_load_solution",
                    CSharp,
                    "solutionPath",
                    &[".sln", ".slnx"],
                ),
                VerificationTool::load(
                    "mcp__codenav__csharp_load_project",
                    CSharp,
                    "projectPath",
                    &[".csproj"],
                ),
                VerificationTool::lookup("mcp__codenav__csharp_hover", CSharp),
                VerificationTool::lookup("mcp__codenav__csharp_goto_definition", CSharp),
                VerificationTool::lookup("mcp__codenav__csharp_symbol_search", CSharp),
                VerificationTool::load(
                    "mcp__codenav__ts_load_project",
                    TypeScript,
                    "projectPath",
                    &["tsconfig.json", "package.json"],
                ),
                VerificationTool::lookup("mcp__codenav__ts_hover", TypeScript),
                VerificationTool::lookup("mcp__codenav__ts_goto_definition", TypeScript),
                VerificationTool::lookup("mcp__codenav__ts_symbol_search", TypeScript),
            ],
        }
    }
}

impl ToolCatalog {
    pub fn find(&self, tool_name: &str) -> Option<&VerificationTool> {
        self.verification.iter().find(|t| t.name == tool_name)
    }

    pub fn is_read_tool(&self, tool_name: &str) -> bool {
        self.read_tools.iter().any(|t| t == tool_name)
    }

    pub fn lookup_tools(&self, dialect: Dialect) -> impl Iterator<Item = &VerificationTool> {
        self.tools(dialect, ToolAction::Lookup)
    }

    /// Workspace-load tools for a dialect, in catalog order.
    pub fn load_tools(&self, dialect: Dialect) -> impl Iterator<Item = &VerificationTool> {
        self.tools(dialect, ToolAction::Load)
    }

    fn tools(
        &self,
        dialect: Dialect,
        action: ToolAction,
    ) -> impl Iterator<Item = &VerificationTool> {
        self.verification
            .iter()
            .filter(move |t| t.dialect == dialect && t.action == action)
    }

    /// The load call to suggest for a dialect given its detected manifests.
    ///
    /// The first load tool, in catalog order, that accepts one of
    /// `manifests` is paired with the first such manifest. Without a match
    /// the first load tool is named on its own.
    pub fn load_hint(&self, dialect: Dialect, manifests: &[String]) -> Option<LoadHint> {
        let matched = self.load_tools(dialect).find_map(|tool| {
            manifests
                .iter()
                .find(|m| tool.accepts(m.as_str()))
                .map(|m| (tool, Some(m.clone())))
        });
        let (tool, target) = match matched {
            Some(found) => found,
            None => (self.load_tools(dialect).next()?, None),
        };
        Some(LoadHint {
            tool: tool.name.clone(),
            argument: target.as_ref().and(tool.argument.clone()),
            target,
        })
    }

    /// Up to `limit` lookup tools to suggest.
    ///
    /// With a known dialect, that dialect's lookup tools in catalog order;
    /// otherwise the first lookup tool of each dialect.
    pub fn suggestions(&self, dialect: Option<Dialect>, limit: usize) -> Vec<String> {
        let tools: Vec<&VerificationTool> = match dialect {
            Some(dialect) => self.lookup_tools(dialect).collect(),
            None => Dialect::ALL
                .into_iter()
                .filter_map(|d| self.lookup_tools(d).next())
                .collect(),
        };
        tools
            .into_iter()
            .take(limit)
            .map(|t| t.name.clone())
            .collect()
    }
}

/// Enforcement gate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnforcementConfig {
    pub mode: EnforcementMode,
    /// Tools treated as edits.
    pub edit_tools: Vec<String>,
    /// Unverified names listed in guidance.
    pub max_listed_names: usize,
    /// Verification tools suggested in guidance.
    pub max_suggested_tools: usize,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            mode: EnforcementMode::Strict,
            edit_tools: ["Write", "Edit", "MultiEdit"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_listed_names: 5,
            max_suggested_tools: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of records with no source file.
    pub verification_ttl_days: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            verification_ttl_days: DEFAULT_TTL_DAYS,
        }
    }
}

/// Event log caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub enforcement_cap: usize,
    pub verification_cap: usize,
    pub session_cap: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enforcement_cap: 1000,
            verification_cap: 500,
            session_cap: 500,
        }
    }
}

/// Workspace scan settings for session bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub max_depth: usize,
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            skip_dirs: [
                ".git",
                ".hg",
                ".svn",
                ".typegate",
                ".vs",
                ".idea",
                "node_modules",
                "bin",
                "obj",
                "target",
                "dist",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Top-level typegate configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub enforcement: EnforcementConfig,
    pub cache: CacheConfig,
    pub logs: LogConfig,
    pub tools: ToolCatalog,
    pub scan: ScanConfig,
}

impl GateConfig {
    /// Reads `config.json` from the workspace state directory; absent means defaults.
    pub fn load(layout: &DataLayout) -> Result<Self, GateError> {
        let config: Self = read_document(&layout.config_file())?.unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), GateError> {
        if self.cache.verification_ttl_days <= 0 {
            return Err(GateError::Config(format!(
                "verification_ttl_days must be positive, got {}",
                self.cache.verification_ttl_days
            )));
        }
        let logs = &self.logs;
        if logs.enforcement_cap == 0 || logs.verification_cap == 0 || logs.session_cap == 0 {
            return Err(GateError::Config("log caps must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Like [`load`](Self::load), but an unusable file is logged and ignored.
    pub fn load_or_default(layout: &DataLayout) -> Self {
        Self::load(layout).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring typegate config");
            Self::default()
        })
    }

    /// Effective mode: `--mode` flag, then the environment, then the config file.
    pub fn resolve_mode(&self, flag: Option<&str>) -> EnforcementMode {
        let env = std::env::var(MODE_ENV_VAR).ok();
        resolve_mode(flag, env.as_deref(), self.enforcement.mode)
    }
}

/// Mode precedence. An unrecognised value is skipped with a warning.
pub fn resolve_mode(
    flag: Option<&str>,
    env: Option<&str>,
    configured: EnforcementMode,
) -> EnforcementMode {
    for (source, value) in [("flag", flag), ("environment", env)] {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        match value.parse() {
            Ok(mode) => return mode,
            Err(e) => warn!(source, error = %e, "ignoring enforcement mode"),
        }
    }
    configured
}
