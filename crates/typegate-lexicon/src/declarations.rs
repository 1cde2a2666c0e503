//! Type declaration and member scanning.
//!
//! Used when ingesting verification results: whole source files are scanned
//! for every type declaration and a bounded window after each one is walked
//! to collect member names. Free-form tool output (hover text, symbol
//! descriptions) goes through [`DeclarationScanner::describe`], which reads
//! one declaration and every member-looking fragment after it.
//!
//! The scanner is lexical. Brace depth is tracked on masked text so braces in
//! strings and comments do not count; members are only read at depth one of
//! the declaration body.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::mask::mask_literals;

/// Maximum number of lines walked after a declaration, the declaration line included.
pub const MAX_SCAN_LINES: usize = 100;

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
    TypeAlias,
    #[default]
    Unknown,
}

impl TypeKind {
    /// Maps a declaration keyword or a tool-reported kind label to a kind.
    pub fn from_keyword(keyword: &str) -> TypeKind {
        let normalized = keyword
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        match normalized.as_str() {
            "class" | "record" | "record class" => TypeKind::Class,
            "interface" => TypeKind::Interface,
            "struct" | "record struct" | "structure" => TypeKind::Struct,
            "enum" | "const enum" => TypeKind::Enum,
            "type" | "type-alias" | "type alias" | "typealias" | "alias" => TypeKind::TypeAlias,
            _ => TypeKind::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Struct => "struct",
            TypeKind::Enum => "enum",
            TypeKind::TypeAlias => "type-alias",
            TypeKind::Unknown => "unknown",
        }
    }
}

/// A type declaration found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub name: String,
    pub kind: TypeKind,
    /// The declaration line, trimmed, without an opening brace.
    pub signature: Option<String>,
    /// 1-based line of the declaration (1 for free text).
    pub line: usize,
    pub properties: Vec<String>,
    pub methods: Vec<String>,
}

impl TypeDeclaration {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            signature: None,
            line: 1,
            properties: Vec::new(),
            methods: Vec::new(),
        }
    }

    fn add(&mut self, member: Member) {
        let (list, name) = match member {
            Member::Property(name) => (&mut self.properties, name),
            Member::Method(name) => (&mut self.methods, name),
        };
        if !list.contains(&name) {
            list.push(name);
        }
    }
}

/// A member name with its property/method split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Property(String),
    Method(String),
}

/// Identifiers that look like method names in a `name(` position but are statements.
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "for", "foreach", "while", "switch", "catch", "using", "lock", "return", "nameof",
    "typeof", "sizeof", "base", "this", "fixed", "checked", "unchecked", "when", "default",
    "new", "function", "super", "await", "throw", "yield",
];

/// Per-dialect declaration and member patterns.
pub struct DeclarationScanner {
    dialect: Dialect,
    declaration: Regex,
    method: Regex,
    property: Regex,
    enum_member: Regex,
}

impl DeclarationScanner {
    /// Compiles the patterns for `dialect`.
    pub fn new(dialect: Dialect) -> Self {
        let (declaration, method, property) = match dialect {
            Dialect::CSharp => (
                r"(?m)^\s*(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static|abstract|sealed|partial|readonly|unsafe|file|new|ref)\s+)*(?P<kw>record\s+struct|record\s+class|class|interface|struct|enum|record)\s+(?P<name>[A-Za-z_][\w.]*)",
                r"^\s*(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static|virtual|override|abstract|sealed|async|extern|new|partial|unsafe)\s+)*(?:[A-Za-z_][\w.]*(?:<[^;=(){}]*>)?(?:\[\])*\??\s+)?(?P<name>[A-Za-z_]\w*)\s*(?:<[^;=(){}]*>)?\s*\(",
                r"^\s*(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static|virtual|override|abstract|sealed|readonly|required|new|const|volatile|event)\s+)*[A-Za-z_][\w.]*(?:<[^;=(){}]*>)?(?:\[\])*\??\s+(?P<name>[A-Za-z_]\w*)\s*(?:\{|=>|=|;)",
            ),
            Dialect::TypeScript => (
                r"(?m)^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:abstract\s+)?(?P<kw>(?:const\s+)?enum|class|interface|type)\s+(?P<name>[A-Za-z_$][\w$.]*)",
                r"^\s*(?:(?:public|private|protected|static|async|abstract|override|readonly|get|set)\s+)*\*?(?P<name>[A-Za-z_$#][\w$]*)\s*\??\s*(?:<[^>]*>)?\s*\(",
                r"^\s*(?:(?:public|private|protected|static|readonly|declare|abstract|override|accessor)\s+)*(?P<name>[A-Za-z_$#][\w$]*)\s*[?!]?\s*(?::|=|;)",
            ),
        };
        Self {
            dialect,
            declaration: Regex::new(declaration).expect("declaration pattern must compile"),
            method: Regex::new(method).expect("method pattern must compile"),
            property: Regex::new(property).expect("property pattern must compile"),
            enum_member: Regex::new(r"^\s*(?:\[[^\]]*\]\s*)*(?P<name>[A-Za-z_]\w*)\s*(?:=\s*[^,]+)?,?\s*$")
                .expect("enum member pattern must compile"),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Every type declaration in a source file, with its members.
    pub fn scan_file(&self, text: &str) -> Vec<TypeDeclaration> {
        let masked = mask_literals(text);
        let masked_lines: Vec<&str> = masked.lines().collect();
        let original_lines: Vec<&str> = text.lines().collect();

        let mut found = Vec::new();
        for (idx, line) in masked_lines.iter().enumerate() {
            let Some((name, kind)) = self.match_declaration(line) else {
                continue;
            };
            let mut decl = TypeDeclaration::new(name, kind);
            decl.line = idx + 1;
            decl.signature = original_lines.get(idx).map(|l| clean_signature(l));
            self.scan_body(&masked_lines[idx..], &mut decl);
            found.push(decl);
        }
        found
    }

    /// The first declaration in free-form tool output and the members that follow it.
    pub fn describe(&self, text: &str) -> Option<TypeDeclaration> {
        let caps = self.declaration.captures(text)?;
        let whole = caps.get(0)?;
        let (name, kind) = self.match_declaration(whole.as_str())?;

        let mut decl = TypeDeclaration::new(name, kind);
        let decl_line = text[whole.start()..]
            .trim_start()
            .lines()
            .next()
            .unwrap_or_default();
        decl.signature = Some(clean_signature(decl_line));

        let rest = &text[whole.end()..];
        let separators: &[char] = match self.dialect {
            Dialect::CSharp => &['\n'],
            Dialect::TypeScript => &['\n', ';', '{', '}'],
        };
        for fragment in rest.split(separators) {
            if fragment.trim().is_empty() || self.declaration.is_match(fragment) {
                continue;
            }
            if let Some(member) = self.classify(fragment, kind) {
                decl.add(member);
            }
        }
        Some(decl)
    }

    /// Classifies one member line of a body of the given kind.
    pub fn classify(&self, line: &str, kind: TypeKind) -> Option<Member> {
        if kind == TypeKind::Enum {
            return self
                .enum_member
                .captures(line)
                .map(|caps| Member::Property(caps["name"].to_string()));
        }
        if let Some(caps) = self.method.captures(line) {
            let name = &caps["name"];
            if !STATEMENT_KEYWORDS.contains(&name) {
                return Some(Member::Method(name.to_string()));
            }
            return None;
        }
        self.property
            .captures(line)
            .map(|caps| caps["name"].to_string())
            .filter(|name| !STATEMENT_KEYWORDS.contains(&name.as_str()))
            .map(Member::Property)
    }

    fn match_declaration(&self, line: &str) -> Option<(String, TypeKind)> {
        let caps = self.declaration.captures(line)?;
        let kind = TypeKind::from_keyword(&caps["kw"]);
        let name = caps["name"].rsplit('.').next()?.to_string();
        if name.is_empty() {
            return None;
        }
        Some((name, kind))
    }

    /// Walks at most [`MAX_SCAN_LINES`] lines from the declaration, collecting
    /// members at depth one until the body closes.
    fn scan_body(&self, lines: &[&str], decl: &mut TypeDeclaration) {
        let mut depth: usize = 0;
        let mut opened = false;

        for (offset, line) in lines.iter().take(MAX_SCAN_LINES).enumerate() {
            if offset > 0 && opened && depth == 1 && !self.declaration.is_match(line) {
                if let Some(member) = self.classify(line, decl.kind) {
                    decl.add(member);
                }
            }

            for c in line.chars() {
                match c {
                    '{' => {
                        depth += 1;
                        opened = true;
                    }
                    '}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }

            if opened && depth == 0 {
                break;
            }
            // Bodiless declarations: `type Id = string;`, `record Point(int X, int Y);`
            if !opened && line.contains(';') {
                break;
            }
        }
    }
}

fn clean_signature(line: &str) -> String {
    line.trim().trim_end_matches('{').trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_keyword() {
        assert_eq!(TypeKind::from_keyword("class"), TypeKind::Class);
        assert_eq!(TypeKind::from_keyword("record  struct"), TypeKind::Struct);
        assert_eq!(TypeKind::from_keyword("Interface"), TypeKind::Interface);
        assert_eq!(TypeKind::from_keyword("type"), TypeKind::TypeAlias);
        assert_eq!(TypeKind::from_keyword("const enum"), TypeKind::Enum);
        assert_eq!(TypeKind::from_keyword("namespace"), TypeKind::Unknown);
    }

    #[test]
    fn test_five_line_csharp_class() {
        let text = "public class User\n{\n    public string Name { get; set; }\n    public void Save() { }\n}\n";
        let decls = DeclarationScanner::new(Dialect::CSharp).scan_file(text);
        assert_eq!(decls.len(), 1);
        let user = &decls[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.kind, TypeKind::Class);
        assert_eq!(user.properties, vec!["Name"]);
        assert_eq!(user.methods, vec!["Save"]);
        assert_eq!(user.signature.as_deref(), Some("public class User"));
    }

    #[test]
    fn test_nested_bodies_are_not_members() {
        let text = r#"
namespace Shop
{
    public sealed class Cart : Entity
    {
        private readonly List<Line> _lines = new();

        public Cart(CustomerId owner)
        {
            if (owner == null) { throw new ArgumentNullException(nameof(owner)); }
            var total = 0;
        }

        public decimal Total => _lines.Sum(l => l.Amount);

        public void Add(Line line)
        {
            _lines.Add(line);
        }
    }
}
"#;
        let decls = DeclarationScanner::new(Dialect::CSharp).scan_file(text);
        assert_eq!(decls.len(), 1);
        let cart = &decls[0];
        assert_eq!(cart.name, "Cart");
        assert_eq!(cart.properties, vec!["_lines", "Total"]);
        assert_eq!(cart.methods, vec!["Cart", "Add"]);
    }

    #[test]
    fn test_csharp_enum_members_are_properties() {
        let text = "public enum Status\n{\n    Active,\n    Suspended = 2,\n    Closed\n}\n";
        let decls = DeclarationScanner::new(Dialect::CSharp).scan_file(text);
        assert_eq!(decls[0].kind, TypeKind::Enum);
        assert_eq!(decls[0].properties, vec!["Active", "Suspended", "Closed"]);
        assert!(decls[0].methods.is_empty());
    }

    #[test]
    fn test_typescript_file() {
        let text = r#"
export interface Order {
  id: number;
  readonly lines: OrderLine[];
  total(): number;
}

export type OrderId = string;

export class OrderStore {
  private cache = new Map<string, Order>();
  constructor(private readonly api: Api) {}
  async load(id: OrderId): Promise<Order> {
    return this.api.get(id);
  }
}
"#;
        let decls = DeclarationScanner::new(Dialect::TypeScript).scan_file(text);
        let names: Vec<_> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Order", "OrderId", "OrderStore"]);

        assert_eq!(decls[0].kind, TypeKind::Interface);
        assert_eq!(decls[0].properties, vec!["id", "lines"]);
        assert_eq!(decls[0].methods, vec!["total"]);

        assert_eq!(decls[1].kind, TypeKind::TypeAlias);
        assert!(decls[1].properties.is_empty());

        assert_eq!(decls[2].properties, vec!["cache"]);
        assert_eq!(decls[2].methods, vec!["constructor", "load"]);
    }

    #[test]
    fn test_scan_window_is_bounded() {
        let mut text = String::from("public class Huge\n{\n");
        for i in 0..150 {
            text.push_str(&format!("    public int Field{} {{ get; set; }}\n", i));
        }
        text.push_str("}\n");
        let decls = DeclarationScanner::new(Dialect::CSharp).scan_file(&text);
        assert_eq!(decls.len(), 1);
        // declaration line + brace line + 98 member lines
        assert_eq!(decls[0].properties.len(), MAX_SCAN_LINES - 2);
    }

    #[test]
    fn test_braces_in_strings_do_not_close_body() {
        let text = "class Fmt\n{\n    public string Open = \"}\";\n    public string Close { get; }\n}\n";
        let decls = DeclarationScanner::new(Dialect::CSharp).scan_file(text);
        assert_eq!(decls[0].properties, vec!["Open", "Close"]);
    }

    #[test]
    fn test_describe_csharp_hover() {
        let text = "```csharp\npublic class MyApp.Models.Customer\n```\npublic string Email { get; set; }\npublic bool IsActive { get; }\npublic void Deactivate()\n";
        let decl = DeclarationScanner::new(Dialect::CSharp).describe(text).unwrap();
        assert_eq!(decl.name, "Customer");
        assert_eq!(decl.kind, TypeKind::Class);
        assert_eq!(decl.properties, vec!["Email", "IsActive"]);
        assert_eq!(decl.methods, vec!["Deactivate"]);
    }

    #[test]
    fn test_describe_typescript_one_liner() {
        let text = "interface Invoice { id: string; amount: number; pay(): Promise<void> }";
        let decl = DeclarationScanner::new(Dialect::TypeScript).describe(text).unwrap();
        assert_eq!(decl.name, "Invoice");
        assert_eq!(decl.kind, TypeKind::Interface);
        assert_eq!(decl.properties, vec!["id", "amount"]);
        assert_eq!(decl.methods, vec!["pay"]);
    }

    #[test]
    fn test_describe_without_declaration() {
        let scanner = DeclarationScanner::new(Dialect::CSharp);
        assert!(scanner.describe("No symbol found at this location.").is_none());
    }
}
