//! Gate decisions and the guidance attached to them.

use serde::{Deserialize, Serialize};
use std::fmt;
use typegate_lexicon::Dialect;

/// What the agent should do before retrying an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guidance {
    /// File the edit targets, if known.
    pub file: Option<String>,
    /// Dialect inferred from the file extension.
    pub dialect: Option<Dialect>,
    /// The first unverified names, sorted.
    pub unverified: Vec<String>,
    /// Unverified names left out of `unverified`.
    pub omitted: usize,
    /// Lookup tools to call.
    pub suggested_tools: Vec<String>,
    /// Workspace-load call to make first, when the dialect's workspace is not loaded.
    pub load: Option<LoadHint>,
}

/// A workspace-load call, with the detected manifest to pass when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadHint {
    pub tool: String,
    /// Request key for the manifest, e.g. `solutionPath`.
    pub argument: Option<String>,
    /// Workspace-relative manifest path.
    pub target: Option<String>,
}

impl fmt::Display for LoadHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.argument, &self.target) {
            (Some(argument), Some(target)) => {
                write!(f, "{}({}: \"{}\")", self.tool, argument, target)
            }
            _ => f.write_str(&self.tool),
        }
    }
}

impl fmt::Display for Guidance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unverified type references")?;
        if let Some(file) = &self.file {
            write!(f, " in {}", file)?;
        }
        write!(f, ": {}", self.unverified.join(", "))?;
        if self.omitted > 0 {
            write!(f, " (and {} more)", self.omitted)?;
        }
        writeln!(f, ".")?;

        if !self.suggested_tools.is_empty() {
            writeln!(f, "Verify them with a language-service lookup before using them:")?;
            for tool in &self.suggested_tools {
                writeln!(f, "  - {}", tool)?;
            }
        }

        if let Some(load) = &self.load {
            let language = self.dialect.map(|d| d.to_string()).unwrap_or_default();
            writeln!(
                f,
                "The {} workspace is not loaded in this session; call {} first.",
                language, load
            )?;
        }
        Ok(())
    }
}

/// Outcome of one enforcement check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Proceed silently.
    Allow,
    /// Proceed, but show the guidance.
    Warn { guidance: Guidance },
    /// Reject the edit.
    Block { guidance: Guidance },
}

impl Decision {
    pub fn allow() -> Self {
        Self::Allow
    }

    pub fn warn(guidance: Guidance) -> Self {
        Self::Warn { guidance }
    }

    pub fn block(guidance: Guidance) -> Self {
        Self::Block { guidance }
    }

    /// True for `Allow` and `Warn`.
    pub fn permits_edit(&self) -> bool {
        !self.is_blocked()
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Block { .. })
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warn { .. })
    }

    pub fn guidance(&self) -> Option<&Guidance> {
        match self {
            Self::Allow => None,
            Self::Warn { guidance } | Self::Block { guidance } => Some(guidance),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allowed"),
            Self::Warn { guidance } => write!(f, "typegate warning: {}", guidance),
            Self::Block { guidance } => write!(f, "typegate blocked this edit. {}", guidance),
        }
    }
}
