//! Source dialects and the strategy table that describes each of them.
//!
//! Everything dialect-specific that is not a lexical rule lives in a
//! [`DialectProfile`]: file extensions, the keywords used to sniff a
//! fragment with no path, and the manifest files that mark a project.
//! Adding a dialect means adding a variant and a profile row.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A supported source dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// C# (`.cs`), projects marked by solution and project files.
    CSharp,
    /// TypeScript and JavaScript, projects marked by `tsconfig.json` / `package.json`.
    TypeScript,
}

/// Static description of a dialect.
#[derive(Debug)]
pub struct DialectProfile {
    /// The dialect this row describes.
    pub dialect: Dialect,
    /// Human-readable name used in guidance text.
    pub display_name: &'static str,
    /// Lowercase file extensions, without the dot.
    pub extensions: &'static [&'static str],
    /// Substrings whose presence suggests a fragment is written in this dialect.
    pub sniff_markers: &'static [&'static str],
    /// Exact manifest file names.
    pub manifest_names: &'static [&'static str],
    /// Manifest file extensions, without the dot.
    pub manifest_extensions: &'static [&'static str],
}

static PROFILES: [DialectProfile; 2] = [
    DialectProfile {
        dialect: Dialect::CSharp,
        display_name: "C#",
        extensions: &["cs", "csx"],
        sniff_markers: &[
            "namespace ",
            "using System",
            "public class ",
            "internal class ",
            "public sealed class ",
            "public record ",
            "{ get;",
            "async Task",
            "private readonly ",
            "[HttpGet",
            "[Fact]",
        ],
        manifest_names: &[],
        manifest_extensions: &["sln", "slnx", "csproj"],
    },
    DialectProfile {
        dialect: Dialect::TypeScript,
        display_name: "TypeScript",
        extensions: &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"],
        sniff_markers: &[
            "export ",
            "import ",
            "const ",
            "let ",
            "function ",
            ": string",
            ": number",
            ": boolean",
            "=> {",
            "readonly ",
            "constructor(",
        ],
        manifest_names: &["tsconfig.json", "package.json"],
        manifest_extensions: &[],
    },
];

impl Dialect {
    /// Every supported dialect, in table order.
    pub const ALL: [Dialect; 2] = [Dialect::CSharp, Dialect::TypeScript];

    /// Returns the strategy row for this dialect.
    pub fn profile(self) -> &'static DialectProfile {
        match self {
            Dialect::CSharp => &PROFILES[0],
            Dialect::TypeScript => &PROFILES[1],
        }
    }

    /// Stable lowercase identifier, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::CSharp => "csharp",
            Dialect::TypeScript => "typescript",
        }
    }

    /// Infers the dialect from a file extension.
    pub fn from_path(path: &Path) -> Option<Dialect> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.profile().extensions.contains(&ext.as_str()))
    }

    /// Returns every dialect whose sniff markers occur in `code`.
    pub fn sniff(code: &str) -> Vec<Dialect> {
        Self::ALL
            .into_iter()
            .filter(|d| d.profile().sniff_markers.iter().any(|m| code.contains(m)))
            .collect()
    }

    /// Chooses the dialects to scan: the extension wins, then a keyword sniff.
    ///
    /// When the sniff is ambiguous (no dialect or several), all dialects are
    /// returned so every rule gets a chance.
    pub fn resolve(code: &str, path: Option<&Path>) -> Vec<Dialect> {
        if let Some(dialect) = path.and_then(Self::from_path) {
            return vec![dialect];
        }
        match Self::sniff(code).as_slice() {
            [single] => vec![*single],
            _ => Self::ALL.to_vec(),
        }
    }

    /// Returns the dialect a manifest file name belongs to, if any.
    pub fn for_manifest(file_name: &str) -> Option<Dialect> {
        let lower = file_name.to_ascii_lowercase();
        let ext = lower.rsplit_once('.').map(|(_, ext)| ext);
        Self::ALL.into_iter().find(|d| {
            let profile = d.profile();
            profile.manifest_names.contains(&lower.as_str())
                || ext.is_some_and(|ext| profile.manifest_extensions.contains(&ext))
        })
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().display_name)
    }
}
