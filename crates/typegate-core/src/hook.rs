//! The JSON event delivered to a hook on stdin.

use crate::error::GateError;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

/// One tool-use or session event from the host.
///
/// Every field is optional; absent keys read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
    #[serde(default)]
    pub tool_response: Option<Value>,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    /// Why a session started (`startup`, `resume`, `clear`, ...).
    #[serde(default)]
    pub source: Option<String>,
}

impl HookInput {
    pub fn parse(raw: &str) -> Result<Self, GateError> {
        serde_json::from_str(raw).map_err(GateError::Input)
    }

    /// First non-empty string among `keys` in `tool_input`.
    pub fn input_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.tool_input.get(key).and_then(Value::as_str))
            .find(|value| !value.trim().is_empty())
    }

    /// Target file of an edit or read, as given by the tool.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.input_str(&["file_path", "filePath"]).map(PathBuf::from)
    }

    /// All code the edit would write: `content`, `new_string` and every
    /// `edits[].new_string`, joined by newlines.
    pub fn edit_text(&self) -> String {
        let mut parts: Vec<&str> = ["content", "new_string"]
            .iter()
            .filter_map(|key| self.tool_input.get(key).and_then(Value::as_str))
            .collect();
        if let Some(edits) = self.tool_input.get("edits").and_then(Value::as_array) {
            parts.extend(
                edits
                    .iter()
                    .filter_map(|edit| edit.get("new_string").and_then(Value::as_str)),
            );
        }
        parts.join("\n")
    }

    /// True when a response is present and does not report an error.
    pub fn is_successful_response(&self) -> bool {
        let Some(response) = &self.tool_response else {
            return false;
        };
        match response {
            Value::Null => false,
            Value::Object(map) => {
                let flagged = ["isError", "is_error"]
                    .iter()
                    .any(|key| map.get(*key).and_then(Value::as_bool).unwrap_or(false));
                let success_false = map.get("success").and_then(Value::as_bool) == Some(false);
                let error_only = map.len() == 1 && map.contains_key("error");
                !(flagged || success_false || error_only)
            }
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        }
    }
}
