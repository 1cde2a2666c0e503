//! # Typegate Core
//!
//! Makes a coding agent look up unfamiliar types before it writes code that
//! uses them. The host calls typegate once per tool-use event; typegate reads
//! the event, consults or updates the per-workspace stores and answers with
//! a decision.
//!
//! ## Event flow
//!
//! ```text
//!   session start ──► SessionBootstrap ──► session_state.json, guidance.txt
//!
//!   before Write/Edit ──► EnforcementGate ──► Allow | Warn | Block
//!                              │
//!                              ├── TypeExtractor (candidates)
//!                              └── CacheStore::status (verified / unverified)
//!
//!   after lookup tool ──► CacheBuilder::ingest_lookup ──► verification_cache.json
//!                    └──► SessionTracker ──────────────► session_state.json
//!   after Read ─────────► CacheBuilder::ingest_file ───► verification_cache.json
//! ```
//!
//! ## Modes
//!
//! | Mode | Unverified references |
//! |------|----------------------|
//! | `strict` | edit blocked, guidance returned |
//! | `warn` | edit allowed, guidance returned |
//! | `disabled` | nothing is extracted |
//!
//! ## Failure policy
//!
//! Storage problems degrade to "less cached", never to a blocked edit. The
//! only deliberate failure is a strict-mode block. Errors returned from this
//! crate are for the binary to log before it allows the event.

mod bootstrap;
mod builder;
mod config;
mod decision;
mod error;
mod events;
mod gate;
mod hook;
mod tracker;
mod typegate;

pub use bootstrap::{detect_projects, BootstrapReport, SessionBootstrap};
pub use builder::CacheBuilder;
pub use config::{
    resolve_mode, CacheConfig, EnforcementConfig, EnforcementMode, GateConfig, LogConfig,
    ScanConfig, ToolAction, ToolCatalog, VerificationTool, MODE_ENV_VAR,
};
pub use decision::{Decision, Guidance, LoadHint};
pub use error::GateError;
pub use events::{code_digest, EnforcementEvent, EnforcementEventKind, SessionEvent, VerificationEvent};
pub use gate::{EditRequest, EnforcementGate};
pub use hook::HookInput;
pub use tracker::{SessionTracker, Tracked};
pub use typegate::{PostToolReport, StatusReport, Typegate};

/// Result type for typegate core operations.
pub type Result<T> = std::result::Result<T, GateError>;

// Re-export the layers below for convenience
pub use typegate_lexicon as lexicon;
pub use typegate_store as store;
