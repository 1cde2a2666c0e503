//! Entries written to the bounded event logs.
//!
//! Every entry carries a random UUID and an RFC 3339 timestamp. Enforcement
//! entries record a SHA-256 digest of the inspected code rather than the
//! code itself.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::config::EnforcementMode;

/// Id and time shared by all entries.
#[derive(Debug, Clone, Serialize)]
pub struct EventHeader {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
}

impl EventHeader {
    pub fn new(session_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementEventKind {
    Allowed,
    Warned,
    Blocked,
}

/// One enforcement decision.
#[derive(Debug, Clone, Serialize)]
pub struct EnforcementEvent {
    #[serde(flatten)]
    pub header: EventHeader,
    pub event: EnforcementEventKind,
    pub mode: EnforcementMode,
    pub tool_name: String,
    pub file_path: Option<String>,
    pub code_sha256: String,
    pub verified: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unverified: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggested_tools: Vec<String>,
}

/// One successful verification-tool call.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationEvent {
    #[serde(flatten)]
    pub header: EventHeader,
    pub tool_name: String,
    pub dialect: String,
    pub action: String,
    pub recorded_types: Vec<String>,
    pub total_verifications: u64,
}

/// A session start.
#[derive(Debug, Clone, Serialize)]
pub struct SessionEvent {
    #[serde(flatten)]
    pub header: EventHeader,
    pub event: &'static str,
    pub source: Option<String>,
    pub workspace: String,
    pub detected: BTreeMap<String, Vec<String>>,
}

/// Hex SHA-256 of `code`.
pub fn code_digest(code: &str) -> String {
    let hash = Sha256::digest(code.as_bytes());
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}
