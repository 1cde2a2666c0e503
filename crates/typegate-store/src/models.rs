//! Verification records and the session-bound cache document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use typegate_lexicon::{TypeDeclaration, TypeKind};

/// Everything known about one verified type.
///
/// `name` is the identity key; a second verification of the same name
/// replaces the record wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub methods: Vec<String>,
    pub verified_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
    /// Modification time of `source_file` when verified, seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_mtime: Option<f64>,
}

/// The caller-supplied part of a record; the store adds the name and timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeInfo {
    pub kind: TypeKind,
    pub signature: Option<String>,
    pub documentation: Option<String>,
    pub properties: Vec<String>,
    pub methods: Vec<String>,
    pub source_file: Option<PathBuf>,
}

impl TypeInfo {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Appends a property name unless it is empty or already present.
    pub fn add_property(&mut self, name: impl Into<String>) {
        push_unique(&mut self.properties, name.into());
    }

    /// Appends a method name unless it is empty or already present.
    pub fn add_method(&mut self, name: impl Into<String>) {
        push_unique(&mut self.methods, name.into());
    }
}

impl From<&TypeDeclaration> for TypeInfo {
    fn from(decl: &TypeDeclaration) -> Self {
        let mut info = TypeInfo::new(decl.kind);
        info.signature = decl.signature.clone();
        decl.properties.iter().for_each(|p| info.add_property(p.as_str()));
        decl.methods.iter().for_each(|m| info.add_method(m.as_str()));
        info
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}

/// One cache generation: the records verified during a single session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationCache {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub verified_types: BTreeMap<String, VerificationRecord>,
}

impl VerificationCache {
    /// An empty generation bound to `session_id`.
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            verified_types: BTreeMap::new(),
        }
    }

    /// True when this generation belongs to `session_id`.
    pub fn is_bound_to(&self, session_id: &str) -> bool {
        self.session_id == session_id
    }

    /// Drops every record and rebinds to `session_id`.
    pub fn reset(&mut self, session_id: &str) {
        self.session_id = session_id.to_string();
        self.verified_types.clear();
    }

    pub fn get(&self, name: &str) -> Option<&VerificationRecord> {
        self.verified_types.get(name)
    }

    pub fn len(&self) -> usize {
        self.verified_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verified_types.is_empty()
    }
}

/// Partition of candidate names by cache validity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStatus {
    pub verified: Vec<String>,
    pub unverified: Vec<String>,
}

impl VerificationStatus {
    pub fn all_verified(&self) -> bool {
        self.unverified.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_info_deduplicates_members() {
        let mut info = TypeInfo::new(TypeKind::Class);
        info.add_property("Name");
        info.add_property("Name");
        info.add_property("");
        info.add_method("Save");
        info.add_method("Save");
        assert_eq!(info.properties, vec!["Name"]);
        assert_eq!(info.methods, vec!["Save"]);
    }

    #[test]
    fn test_record_serialized_shape() {
        let record = VerificationRecord {
            name: "User".to_string(),
            kind: TypeKind::TypeAlias,
            signature: None,
            documentation: None,
            properties: vec![],
            methods: vec![],
            verified_at: "2026-01-02T03:04:05Z".parse().unwrap(),
            source_file: None,
            file_mtime: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["kind"], "type-alias");
        assert_eq!(value["verified_at"], "2026-01-02T03:04:05Z");
        assert!(value.get("source_file").is_none());
    }

    #[test]
    fn test_reset_rebinds_session() {
        let mut cache = VerificationCache::for_session("old");
        cache.verified_types.insert(
            "User".to_string(),
            serde_json::from_value(serde_json::json!({
                "name": "User",
                "verified_at": "2026-01-02T03:04:05Z"
            }))
            .unwrap(),
        );
        cache.reset("new");
        assert!(cache.is_bound_to("new"));
        assert!(cache.is_empty());
    }
}
