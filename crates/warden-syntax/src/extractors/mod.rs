//! Built-in [`SpanExtractor`](crate::SpanExtractor) implementations.
//!
//! Python, Rust, and TypeScript are parsed with Tree-sitter; the shared
//! lookup rules live in `tree`. C and C++ have no bundled grammar and are
//! handled by the heuristic scanner in `c_family`.

mod c_family;
mod python;
mod rust;
mod tree;
mod typescript;

pub use c_family::{CFamilyExtractor, Dialect};
pub use python::PythonExtractor;
pub use rust::RustExtractor;
pub use typescript::TypeScriptExtractor;
