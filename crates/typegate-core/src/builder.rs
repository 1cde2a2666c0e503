//! # Cache Builder
//!
//! Turns successful verification results into cache records.
//!
//! ## Lookup results
//!
//! Language-service tools answer in many shapes. The payload is unwrapped
//! until it reaches either a JSON object that describes a symbol or a piece
//! of free text:
//!
//! | Shape | Handling |
//! |-------|----------|
//! | `[{type: "text", text}]` (MCP content) | each `text` is re-read |
//! | `{content: [...]}` (MCP result) | `content` is re-read |
//! | string containing JSON | parsed and re-read |
//! | `{symbol \| type \| result \| symbols \| results: ...}` | inner value is re-read; an inner object inherits the outer fields it lacks |
//! | array | every element is re-read |
//! | object | read field by field |
//! | other string | scanned with the dialect's declaration patterns |
//!
//! ## Source files
//!
//! A file read by the agent is scanned for every type declaration, each of
//! which becomes one record bound to the file and its modification time.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;
use typegate_lexicon::{DeclarationScanner, Dialect, TypeKind};
use typegate_store::{CacheStore, TypeInfo};

/// Keys that may hold the symbol name, in priority order.
const NAME_KEYS: &[&str] = &["name", "symbol", "symbolName", "typeName"];
const SIGNATURE_KEYS: &[&str] = &["signature", "declaration"];
const DOC_KEYS: &[&str] = &["documentation", "docs", "summary"];
const FILE_KEYS: &[&str] = &["filePath", "file_path"];
/// Request parameters naming the looked-up symbol.
const REQUEST_NAME_KEYS: &[&str] = &["typeName", "symbolName", "query"];
/// Keys wrapping the actual record.
const WRAPPER_KEYS: &[&str] = &["symbol", "type", "result", "symbols", "results"];
/// Member kind tags that mean "method".
const METHOD_KINDS: &[&str] = &["method", "function", "constructor", "ctor", "operator"];

/// A payload reduced to something readable.
#[derive(Debug)]
enum Payload {
    Record(Map<String, Value>),
    Text(String),
}

/// Writes lookup and file-read results into the verification cache.
pub struct CacheBuilder {
    cache: CacheStore,
    workspace: PathBuf,
}

impl CacheBuilder {
    /// `workspace` anchors relative source paths.
    pub fn new(cache: CacheStore, workspace: impl Into<PathBuf>) -> Self {
        Self {
            cache,
            workspace: workspace.into(),
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Records every symbol found in a lookup response; returns the recorded names.
    ///
    /// `dialect` selects the free-text patterns; `None` tries each dialect.
    pub fn ingest_lookup(
        &self,
        response: &Value,
        request: &Value,
        dialect: Option<Dialect>,
        session_id: &str,
    ) -> Vec<String> {
        let mut payloads = Vec::new();
        collect_payloads(response, &mut payloads);

        let fallback_name = first_str(request, REQUEST_NAME_KEYS).map(simple_name);
        let fallback_file = first_str(request, FILE_KEYS).map(PathBuf::from);

        let mut recorded = Vec::new();
        for payload in payloads {
            let parsed = match payload {
                Payload::Record(map) => read_record(&map),
                Payload::Text(text) => read_text(&text, dialect),
            };
            let Some((name, mut info)) = parsed else {
                continue;
            };
            let Some(name) = name.or_else(|| fallback_name.clone()).filter(|n| !n.is_empty()) else {
                debug!("lookup payload without a name, skipping");
                continue;
            };
            if info.source_file.is_none() {
                info.source_file = fallback_file.clone();
            }
            info.source_file = info.source_file.map(|p| self.resolve(&p));

            if self.cache.record(&name, info, session_id).is_some() && !recorded.contains(&name) {
                recorded.push(name);
            }
        }
        recorded
    }

    /// Records every type declared in a source file; returns the recorded names.
    pub fn ingest_file(&self, path: &Path, text: &str, session_id: &str) -> Vec<String> {
        let Some(dialect) = Dialect::from_path(path) else {
            return Vec::new();
        };
        let source = self.resolve(path);

        let mut recorded = Vec::new();
        for decl in DeclarationScanner::new(dialect).scan_file(text) {
            let mut info = TypeInfo::from(&decl);
            info.source_file = Some(source.clone());
            if self.cache.record(&decl.name, info, session_id).is_some()
                && !recorded.contains(&decl.name)
            {
                recorded.push(decl.name);
            }
        }
        debug!(file = %source.display(), count = recorded.len(), "ingested source file");
        recorded
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }
}

fn collect_payloads(value: &Value, out: &mut Vec<Payload>) {
    match value {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => collect_payloads(&parsed, out),
            _ if !text.trim().is_empty() => out.push(Payload::Text(text.clone())),
            _ => {}
        },
        Value::Array(items) => items.iter().for_each(|item| collect_payloads(item, out)),
        Value::Object(map) => {
            if let Some(text) = content_text(map) {
                collect_payloads(text, out);
            } else if let Some(content) = map.get("content").filter(|c| c.is_array()) {
                collect_payloads(content, out);
            } else if let Some((key, inner)) = WRAPPER_KEYS.iter().find_map(|key| {
                map.get(*key)
                    .filter(|v| v.is_object() || v.is_array())
                    .map(|v| (*key, v))
            }) {
                match inner {
                    Value::Object(record) => {
                        collect_payloads(&Value::Object(merge_siblings(record, map, key)), out)
                    }
                    _ => collect_payloads(inner, out),
                }
            } else {
                out.push(Payload::Record(map.clone()));
            }
        }
        _ => {}
    }
}

/// `inner` plus every field of `outer` it lacks, except the wrapper key itself.
fn merge_siblings(
    inner: &Map<String, Value>,
    outer: &Map<String, Value>,
    wrapper: &str,
) -> Map<String, Value> {
    let mut merged = inner.clone();
    for (key, value) in outer {
        if key != wrapper && !merged.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// The `text` of an MCP `{type: "text", text}` content block.
fn content_text(map: &Map<String, Value>) -> Option<&Value> {
    if map.get("type").and_then(Value::as_str) == Some("text") {
        map.get("text")
    } else {
        None
    }
}

fn read_record(map: &Map<String, Value>) -> Option<(Option<String>, TypeInfo)> {
    let name = NAME_KEYS
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_str))
        .map(simple_name)
        .find(|n| !n.is_empty());

    let kind = map
        .get("kind")
        .and_then(Value::as_str)
        .map(TypeKind::from_keyword)
        .unwrap_or_default();

    let mut info = TypeInfo::new(kind);
    info.signature = first_str_in(map, SIGNATURE_KEYS).map(str::to_string);
    info.documentation = first_str_in(map, DOC_KEYS).map(str::to_string);
    info.source_file = source_file(map);

    if let Some(members) = map.get("members").and_then(Value::as_array) {
        for member in members {
            match member {
                Value::String(s) if s.contains('(') => info.add_method(member_name(s)),
                Value::String(s) => info.add_property(member_name(s)),
                Value::Object(m) => {
                    let Some(name) = first_str_in(m, NAME_KEYS) else {
                        continue;
                    };
                    if is_method_member(m) {
                        info.add_method(member_name(name));
                    } else {
                        info.add_property(member_name(name));
                    }
                }
                _ => {}
            }
        }
    }
    for (key, is_method) in [("properties", false), ("fields", false), ("methods", true)] {
        let Some(items) = map.get(key).and_then(Value::as_array) else {
            continue;
        };
        for item in items {
            let name = match item {
                Value::String(s) => Some(s.as_str()),
                Value::Object(m) => first_str_in(m, NAME_KEYS),
                _ => None,
            };
            if let Some(name) = name.map(member_name) {
                if is_method {
                    info.add_method(name);
                } else {
                    info.add_property(name);
                }
            }
        }
    }

    Some((name, info))
}

fn read_text(text: &str, dialect: Option<Dialect>) -> Option<(Option<String>, TypeInfo)> {
    let dialects = match dialect {
        Some(d) => vec![d],
        None => Dialect::ALL.to_vec(),
    };
    let described = dialects
        .into_iter()
        .find_map(|d| DeclarationScanner::new(d).describe(text));

    match described {
        Some(decl) => Some((Some(decl.name.clone()), TypeInfo::from(&decl))),
        None => Some((None, TypeInfo::default())),
    }
}

fn is_method_member(member: &Map<String, Value>) -> bool {
    ["kind", "memberKind", "type"]
        .iter()
        .filter_map(|key| member.get(*key).and_then(Value::as_str))
        .any(|kind| METHOD_KINDS.contains(&kind.to_ascii_lowercase().as_str()))
}

fn source_file(map: &Map<String, Value>) -> Option<PathBuf> {
    if let Some(path) = first_str_in(map, FILE_KEYS) {
        return Some(PathBuf::from(path));
    }
    match map.get("location")? {
        Value::String(s) => Some(PathBuf::from(location_path(s))),
        Value::Object(loc) => first_str_in(loc, &["file", "filePath", "file_path", "path"])
            .map(PathBuf::from),
        _ => None,
    }
}

/// Strips a trailing `:line[:col]` from a location string.
fn location_path(location: &str) -> &str {
    let mut path = location;
    for _ in 0..2 {
        match path.rsplit_once(':') {
            Some((head, tail)) if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) => {
                path = head
            }
            _ => break,
        }
    }
    path
}

fn first_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    value.as_object().and_then(|map| first_str_in(map, keys))
}

fn first_str_in<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
}

/// Last segment of a qualified name, without generic arguments.
fn simple_name(name: &str) -> String {
    let base = name.trim().split(['<', '(', '`']).next().unwrap_or_default();
    base.rsplit('.').next().unwrap_or_default().trim().to_string()
}

/// Member name from a label like `Save(int)` or `Name: string`.
fn member_name(label: &str) -> String {
    let base = label.trim().split(['(', ':', '<', ' ']).next().unwrap_or_default();
    base.rsplit('.').next().unwrap_or_default().to_string()
}
