//! Source-span extraction for the Warden protection toolchain.
//!
//! This crate answers one question: given the text of a source file and the
//! name of a definition, which exact bytes make up that definition? The
//! answer feeds the fingerprints that `warden-core` persists and later
//! re-derives to detect drift.
//!
//! - **Syntax-tree extractors** parse the file with Tree-sitter and locate
//!   top-level definitions (plus qualified members such as `Class.method`).
//! - **Heuristic extractors** scan languages without a bundled grammar using
//!   brace balance and keyword anchors.
//! - **[`ExtractorRegistry`]** maps file extensions to extractors. It is an
//!   ordinary value constructed once per invocation; new languages register
//!   against it without touching the rest of the toolchain.
//!
//! # Supported Languages
//!
//! - Python (`.py`, `.pyi`, `.pyw`) via Tree-sitter
//! - Rust (`.rs`) via Tree-sitter
//! - TypeScript (`.ts`, `.tsx`, `.mts`, `.cts`) via Tree-sitter
//! - C and C++ (`.c`, `.h`, `.cpp`, `.hpp`, `.cc`, `.cxx`, `.hxx`) via the
//!   heuristic scanner
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use warden_syntax::ExtractorRegistry;
//!
//! let registry = ExtractorRegistry::with_defaults();
//! let extractor = registry.for_path(Path::new("calc.py"))?;
//! let span = extractor.extract("def calc():\n    return 1\n", "calc")?;
//! assert_eq!(span.text(), "def calc():\n    return 1");
//! # Ok::<(), warden_syntax::ExtractError>(())
//! ```

mod error;
mod extractor;
mod extractors;
mod language;
mod parser;
mod position;
mod span;

pub use error::ExtractError;
pub use extractor::{ExtractorRegistry, SpanExtractor};
pub use extractors::{
    CFamilyExtractor, Dialect, PythonExtractor, RustExtractor, TypeScriptExtractor,
};
pub use language::SupportedLanguage;
pub use span::Span;

#[cfg(test)]
mod tests;
