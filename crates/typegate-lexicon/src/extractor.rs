//! Reference extractor facade.
//!
//! Combines dialect selection, literal masking, the rule table and the
//! candidate filter into a single call.

use std::collections::BTreeSet;
use std::path::Path;

use crate::dialect::Dialect;
use crate::mask::mask_literals;
use crate::rules::{default_rules, ExtractionRule};
use crate::whitelist::is_known;

/// Identifiers this short are never treated as type references.
pub const MIN_CANDIDATE_LEN: usize = 3;

/// Scans code fragments for identifiers that look like type references.
pub struct TypeExtractor {
    rules: Vec<ExtractionRule>,
}

impl TypeExtractor {
    /// Extractor with the built-in rule table.
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Extractor with a custom rule table.
    pub fn with_rules(rules: Vec<ExtractionRule>) -> Self {
        Self { rules }
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    /// Candidate type names in `code`.
    ///
    /// The dialect comes from `file_path` when its extension is recognised,
    /// otherwise from a keyword sniff; ambiguous fragments are scanned with
    /// every dialect.
    pub fn extract(&self, code: &str, file_path: Option<&Path>) -> BTreeSet<String> {
        if code.trim().is_empty() {
            return BTreeSet::new();
        }
        let masked = mask_literals(code);
        let dialects = Dialect::resolve(&masked, file_path);
        self.scan(&masked, &dialects)
    }

    /// Candidate type names in `code`, scanning with an explicit dialect set.
    pub fn extract_for(&self, code: &str, dialects: &[Dialect]) -> BTreeSet<String> {
        if code.trim().is_empty() {
            return BTreeSet::new();
        }
        self.scan(&mask_literals(code), dialects)
    }

    fn scan(&self, masked: &str, dialects: &[Dialect]) -> BTreeSet<String> {
        self.rules
            .iter()
            .filter(|rule| rule.applies_to(dialects))
            .flat_map(|rule| rule.captures(masked))
            .filter(|name| is_candidate(name, dialects))
            .collect()
    }
}

impl Default for TypeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Filter applied to every raw capture: long enough, capitalised, not whitelisted.
pub fn is_candidate(name: &str, dialects: &[Dialect]) -> bool {
    name.chars().count() >= MIN_CANDIDATE_LEN
        && name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && !is_known(name, dialects)
}
