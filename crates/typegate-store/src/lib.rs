//! # Typegate Store
//!
//! The durable state shared between hook invocations. Each invocation is a
//! separate short-lived process, so nothing is kept in memory: every
//! operation loads a JSON document, mutates it and writes it back.
//!
//! | Store | File | Failure behaviour |
//! |-------|------|-------------------|
//! | [`CacheStore`] | `data/verification_cache.json` | unreadable → empty, unbound |
//! | [`SessionStore`] | `data/session_state.json` | bad fields → defaults |
//! | [`EventLog`] | `logs/*.json` | unreadable → empty, capped on append |
//!
//! Every store offers `try_*` methods returning [`StoreError`] and plain
//! methods that log and swallow the error.
//!
//! ## Concurrency
//!
//! There is no file locking. Two hook processes that load the same version
//! of a document and both save will lose one update. Hosts dispatch tool
//! events sequentially per session, so this is accepted.

pub mod cache;
pub mod document;
pub mod error;
pub mod journal;
pub mod layout;
pub mod models;
pub mod session;

pub use cache::{mtime_secs, CacheStore, DEFAULT_TTL_DAYS};
pub use error::{Result, StoreError};
pub use journal::EventLog;
pub use layout::DataLayout;
pub use models::{TypeInfo, VerificationCache, VerificationRecord, VerificationStatus};
pub use session::{
    Detection, DialectSession, EnforcementOutcome, ProjectDetection, SessionState, SessionStore,
    Statistics,
};
