//! The extraction rule table.
//!
//! Each rule is one lexical position where a type name tends to appear.
//! Rules are independent: every rule sees the whole (masked) fragment and
//! contributes its own captures, so precision and recall can be tuned and
//! tested one rule at a time. Filtering (whitelist, length, case) happens in
//! the extractor, not here.
//!
//! | Rule | Dialects | Catches |
//! |------|----------|---------|
//! | `instantiation` | all | `new Order(` |
//! | `declaration` | C# | `Order order =` |
//! | `return-type` | C# | `public Order Find(` |
//! | `nullable-suffix` | C# | `Order? order` |
//! | `nullable-annotation` | TS | `order?: Order` |
//! | `annotation` | all | `: Order` (annotation or base type) |
//! | `generic-single` | all | `<Order>` |
//! | `generic-list` | all | `<string, Order>`, `<Order \| null>` |
//! | `generic-nested` | all | `<Page<`, `, Page<` |
//! | `qualified-type` | all | `Models.Order order =` |
//! | `static-access` | all | `OrderFactory.Create(` |
//! | `type-test` | all | `is Order`, `as Order`, `instanceof Order` |
//! | `typeof` | all | `typeof(Order)`, `typeof Order` |
//! | `parameter` | C# | `(Order order, ...)` |
//! | `declaration-keyword` | all | `class Order`, `extends Base`, `implements IShape` |
//! | `heritage-list` | all | `: Base, IShape {`, `implements A, B {` |

use crate::dialect::Dialect;
use regex::Regex;

const ALL: &[Dialect] = &[Dialect::CSharp, Dialect::TypeScript];
const CSHARP: &[Dialect] = &[Dialect::CSharp];
const TYPESCRIPT: &[Dialect] = &[Dialect::TypeScript];

/// How a rule's match is turned into identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// The `ty` group holds exactly one identifier.
    Single,
    /// The `list` group holds a type list; every identifier in it counts.
    List,
}

/// A named lexical rule.
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    name: &'static str,
    dialects: &'static [Dialect],
    pattern: Regex,
    capture: Capture,
}

impl ExtractionRule {
    /// Compiles a rule. The pattern must define a `ty` group for
    /// [`Capture::Single`] or a `list` group for [`Capture::List`].
    pub fn new(
        name: &'static str,
        dialects: &'static [Dialect],
        pattern: &str,
        capture: Capture,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            dialects,
            pattern: Regex::new(pattern)?,
            capture,
        })
    }

    /// Stable rule identifier, e.g. `instantiation`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Dialects the rule is evaluated for.
    pub fn dialects(&self) -> &'static [Dialect] {
        self.dialects
    }

    /// True when the rule is meaningful for at least one of `dialects`.
    pub fn applies_to(&self, dialects: &[Dialect]) -> bool {
        self.dialects.iter().any(|d| dialects.contains(d))
    }

    /// Raw identifiers captured from `code`, unfiltered and in match order.
    pub fn captures(&self, code: &str) -> Vec<String> {
        let mut found = Vec::new();
        for caps in self.pattern.captures_iter(code) {
            match self.capture {
                Capture::Single => {
                    if let Some(m) = caps.name("ty") {
                        found.push(m.as_str().to_string());
                    }
                }
                Capture::List => {
                    if let Some(m) = caps.name("list") {
                        found.extend(split_type_list(m.as_str()));
                    }
                }
            }
        }
        found
    }
}

/// Splits a type list into identifiers, keeping the last segment of dotted paths.
fn split_type_list(list: &str) -> Vec<String> {
    list.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
        .filter_map(|path| path.rsplit('.').next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// `(name, dialects, pattern, capture)` rows, in evaluation order.
const RULE_TABLE: &[(&str, &[Dialect], &str, Capture)] = &[
    (
        "instantiation",
        ALL,
        r"\bnew\s+(?:[A-Za-z_]\w*\.)*(?P<ty>[A-Z]\w*)",
        Capture::Single,
    ),
    (
        "declaration",
        CSHARP,
        r"(?m)(?:^|[\s(,;{])(?P<ty>[A-Z]\w*)(?:<[^;=(){}]*>)?(?:\[\])*\??\s+[a-z_]\w*\s*(?:[=;),]|\bin\b)",
        Capture::Single,
    ),
    (
        "return-type",
        CSHARP,
        r"\b(?:public|private|protected|internal|static|async|virtual|override|abstract|sealed|extern|partial|readonly|required)\s+(?P<ty>[A-Z]\w*)(?:<[^;=(){}]*>)?(?:\[\])*\??\s+[A-Z]\w*\s*(?:[(<{]|=>)",
        Capture::Single,
    ),
    (
        "nullable-suffix",
        CSHARP,
        r"\b(?P<ty>[A-Z]\w*)\?[\s>,)\]]",
        Capture::Single,
    ),
    (
        "nullable-annotation",
        TYPESCRIPT,
        r"\?\s*:\s*(?:[A-Za-z_]\w*\.)*(?P<ty>[A-Z]\w*)",
        Capture::Single,
    ),
    (
        "annotation",
        ALL,
        r":\s*(?:readonly\s+)?(?P<ty>[A-Z]\w*)",
        Capture::Single,
    ),
    (
        "generic-single",
        ALL,
        r"<\s*(?P<ty>[A-Z]\w*)(?:\[\])?\??\s*>",
        Capture::Single,
    ),
    (
        "generic-list",
        ALL,
        r"<(?P<list>[^<>;=(){}]*[,|&][^<>;=(){}]*)>",
        Capture::List,
    ),
    (
        "generic-nested",
        ALL,
        r"[<,]\s*(?P<ty>[A-Z]\w*)<",
        Capture::Single,
    ),
    (
        "qualified-type",
        ALL,
        r"\.(?P<ty>[A-Z]\w*)(?:<[^;=(){}]*>)?(?:\[\])*\??\s+[a-z_]\w*\s*(?:[=;),]|\bin\b)",
        Capture::Single,
    ),
    (
        "static-access",
        ALL,
        r"(?m)(?:^|[^.\w])(?P<ty>[A-Z]\w*)\.[A-Za-z_]\w*\s*[(<]",
        Capture::Single,
    ),
    (
        "type-test",
        ALL,
        r"\b(?:is|as|instanceof)\s+(?:not\s+)?(?:[A-Za-z_]\w*\.)*(?P<ty>[A-Z]\w*)",
        Capture::Single,
    ),
    (
        "typeof",
        ALL,
        r"\btypeof\s*\(?\s*(?:[A-Za-z_]\w*\.)*(?P<ty>[A-Z]\w*)",
        Capture::Single,
    ),
    (
        "parameter",
        CSHARP,
        r"[(,]\s*(?:\[[^\]]*\]\s*)?(?:(?:ref|out|in|params|this|readonly|scoped)\s+)*(?:[A-Za-z_]\w*\.)*(?P<ty>[A-Z]\w*)(?:<[^;=(){}]*>)?(?:\[\])*\??\s+[a-z_]\w*\s*[,)=]",
        Capture::Single,
    ),
    (
        "declaration-keyword",
        ALL,
        r"\b(?:interface|type|class|extends|implements)\s+(?P<ty>[A-Z]\w*)",
        Capture::Single,
    ),
    (
        "heritage-list",
        ALL,
        r"(?m)(?:\b(?:class|struct|interface|record)\s+\w+(?:<[^>{]*>)?\s*:|\bimplements|\bextends)\s+(?P<list>[\w\s,.<>]+?)\s*(?:\{|\bwhere\b|$)",
        Capture::List,
    ),
];

/// Builds the default rule table.
pub fn default_rules() -> Vec<ExtractionRule> {
    RULE_TABLE
        .iter()
        .map(|&(name, dialects, pattern, capture)| {
            ExtractionRule::new(name, dialects, pattern, capture)
                .expect("built-in extraction rule must compile")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> ExtractionRule {
        default_rules()
            .into_iter()
            .find(|r| r.name() == name)
            .unwrap_or_else(|| panic!("no rule named {}", name))
    }

    fn caught(name: &str, code: &str) -> Vec<String> {
        rule(name).captures(code)
    }

    #[test]
    fn test_rule_names_unique() {
        let rules = default_rules();
        let mut names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), rules.len());
    }

    #[test]
    fn test_instantiation() {
        assert_eq!(caught("instantiation", "var u = new User();"), vec!["User"]);
        assert_eq!(
            caught("instantiation", "var sb = new System.Text.StringBuilder();"),
            vec!["StringBuilder"]
        );
        assert!(caught("instantiation", "var x = new();").is_empty());
    }

    #[test]
    fn test_declaration() {
        assert_eq!(caught("declaration", "User u = GetUser();"), vec!["User"]);
        assert_eq!(caught("declaration", "    Invoice[] invoices;"), vec!["Invoice"]);
        assert_eq!(caught("declaration", "foreach (Order o in orders)"), vec!["Order"]);
        assert!(caught("declaration", "var user = Load();").is_empty());
    }

    #[test]
    fn test_return_type() {
        assert_eq!(
            caught("return-type", "public Customer Find(int id)"),
            vec!["Customer"]
        );
        assert_eq!(
            caught("return-type", "public Address Home { get; set; }"),
            vec!["Address"]
        );
        assert!(caught("return-type", "public void Save()").is_empty());
    }

    #[test]
    fn test_nullable() {
        assert_eq!(caught("nullable-suffix", "Customer? c = null;"), vec!["Customer"]);
        assert!(caught("nullable-suffix", "var n = Customer?.Name;").is_empty());
        assert_eq!(caught("nullable-annotation", "owner?: Account;"), vec!["Account"]);
    }

    #[test]
    fn test_annotation() {
        assert_eq!(caught("annotation", "let repo: UserRepository;"), vec!["UserRepository"]);
        assert_eq!(caught("annotation", "class Admin : User"), vec!["User"]);
        assert!(caught("annotation", "let n: number = 1;").is_empty());
    }

    #[test]
    fn test_generics() {
        assert_eq!(caught("generic-single", "List<Order> orders"), vec!["Order"]);
        assert_eq!(
            caught("generic-list", "Dictionary<string, Order> byId"),
            vec!["string", "Order"]
        );
        assert_eq!(
            caught("generic-list", "Promise<Order | undefined>"),
            vec!["Order", "undefined"]
        );
        assert_eq!(
            caught("generic-nested", "Task<Page<Order>> LoadAsync()"),
            vec!["Page"]
        );
    }

    #[test]
    fn test_qualified_type() {
        assert_eq!(
            caught("qualified-type", "Models.Invoice invoice = null;"),
            vec!["Invoice"]
        );
    }

    #[test]
    fn test_static_access() {
        assert_eq!(
            caught("static-access", "var u = UserFactory.Create(name);"),
            vec!["UserFactory"]
        );
        assert!(caught("static-access", "this.Items.Add(x);").is_empty());
        assert!(caught("static-access", "user.Name.Trim();").is_empty());
    }

    #[test]
    fn test_type_tests() {
        assert_eq!(caught("type-test", "if (shape is Circle c)"), vec!["Circle"]);
        assert_eq!(caught("type-test", "var s = obj as Square;"), vec!["Square"]);
        assert_eq!(caught("type-test", "if (e instanceof HttpFailure)"), vec!["HttpFailure"]);
        assert_eq!(caught("typeof", "typeof(Widget)"), vec!["Widget"]);
        assert_eq!(caught("typeof", "type K = keyof typeof Palette;"), vec!["Palette"]);
    }

    #[test]
    fn test_parameter() {
        assert_eq!(
            caught("parameter", "void Handle(Command cmd, int retries)"),
            vec!["Command"]
        );
        assert_eq!(
            caught("parameter", "Post([FromBody] CreateUserRequest request)"),
            vec!["CreateUserRequest"]
        );
    }

    #[test]
    fn test_declaration_keywords() {
        assert_eq!(caught("declaration-keyword", "interface Shape {"), vec!["Shape"]);
        assert_eq!(caught("declaration-keyword", "type Id = string;"), vec!["Id"]);
        assert_eq!(
            caught("declaration-keyword", "class Square extends Shape"),
            vec!["Square", "Shape"]
        );
    }

    #[test]
    fn test_heritage_list() {
        assert_eq!(
            caught("heritage-list", "public class Repo : BaseRepo, IRepo<Order>\n{"),
            vec!["BaseRepo", "IRepo", "Order"]
        );
        assert_eq!(
            caught("heritage-list", "class A implements Drawable, Sizable {"),
            vec!["Drawable", "Sizable"]
        );
    }

    #[test]
    fn test_dialect_applicability() {
        assert!(rule("parameter").applies_to(&[Dialect::CSharp]));
        assert!(!rule("parameter").applies_to(&[Dialect::TypeScript]));
        assert!(rule("nullable-annotation").applies_to(&Dialect::ALL));
        assert_eq!(rule("parameter").dialects(), &[Dialect::CSharp]);
    }
}
