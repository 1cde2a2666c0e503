//! # Typegate Lexicon
//!
//! Lexical analysis behind the typegate edit gate. Nothing here parses a full
//! grammar; every answer comes from a small regex rule table run over text
//! whose comments and literal contents have been blanked out.
//!
//! ## Components
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`dialect`] | C# / TypeScript detection from extension, keywords or manifest |
//! | [`whitelist`] | Names that never need verification |
//! | [`mask`] | Blanking of comments and string/char/template literals |
//! | [`rules`] | Named extraction rules, one per syntactic position |
//! | [`extractor`] | Rule table + whitelist filter as one call |
//! | [`declarations`] | Declaration and member scanning for cache ingestion |
//!
//! ## Pipeline
//!
//! ```text
//!   code ──► mask ──► dialect ──► rules (applicable) ──► candidate filter ──► names
//!                       │                                    │
//!                 extension wins,                  len ≥ 3, uppercase,
//!                 sniff otherwise                  not whitelisted
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use std::path::Path;
//! use typegate_lexicon::TypeExtractor;
//!
//! let names = TypeExtractor::new().extract("User u = new User();", Some(Path::new("A.cs")));
//! assert!(names.contains("User"));
//! ```
//!
//! ## Limitations
//!
//! - Over-extraction is expected: a capitalised local in a declaration
//!   position looks exactly like a type.
//! - Interpolation holes inside template literals are blanked with the rest
//!   of the literal, so types referenced only there are missed.

pub mod declarations;
pub mod dialect;
pub mod extractor;
pub mod mask;
pub mod rules;
pub mod whitelist;

pub use declarations::{DeclarationScanner, Member, TypeDeclaration, TypeKind};
pub use dialect::{Dialect, DialectProfile};
pub use extractor::{is_candidate, TypeExtractor};
pub use mask::mask_literals;
pub use rules::{default_rules, Capture, ExtractionRule};
pub use whitelist::{is_known, known_types};
