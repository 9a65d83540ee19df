//! The extractor capability and the extension-keyed registry.
//!
//! Every supported language provides one [`SpanExtractor`]. The
//! [`ExtractorRegistry`] maps file extensions onto those extractors and is
//! passed explicitly to whoever needs it, so tests and embedders can build
//! registries with exactly the languages they want.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::ExtractError;
use crate::extractors::{
    CFamilyExtractor, Dialect, PythonExtractor, RustExtractor, TypeScriptExtractor,
};
use crate::language::SupportedLanguage;
use crate::span::Span;

/// Locates and enumerates named definitions in source text.
///
/// Implementations hold no state between calls: every method is a pure
/// function of the text it is given.
pub trait SpanExtractor: Send + Sync {
    /// A short lower-case language label used in diagnostics.
    fn language(&self) -> &'static str;

    /// The token joining a container and a member in qualified names, such
    /// as `.` in `Widget.render` or `::` in `Shape::area`.
    fn scope_separator(&self) -> &'static str;

    /// Returns the exact defining span of `name`.
    ///
    /// `name` is either a top-level definition or a qualified member
    /// (`Container<sep>member`).
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::NotFound`] when no such definition exists,
    /// [`ExtractError::Ambiguous`] when the scope defines the name more than
    /// once, and [`ExtractError::Parse`] when the source is too broken to
    /// decide.
    fn extract(&self, source: &str, name: &str) -> Result<Span, ExtractError>;

    /// Lists top-level definition names in definition order, each once.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be parsed at all.
    fn list(&self, source: &str) -> Result<Vec<String>, ExtractError>;

    /// Lists the qualified member names of `container`, in definition order.
    ///
    /// An unknown container yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be parsed at all.
    fn members(&self, source: &str, container: &str) -> Result<Vec<String>, ExtractError>;
}

/// Maps file extensions to the extractor responsible for them.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    by_extension: HashMap<String, Arc<dyn SpanExtractor>>,
}

impl ExtractorRegistry {
    /// Creates a registry with no languages.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in extractors.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(
            SupportedLanguage::Python.extensions(),
            Arc::new(PythonExtractor::new()),
        );
        registry.register(
            SupportedLanguage::Rust.extensions(),
            Arc::new(RustExtractor::new()),
        );
        registry.register(
            SupportedLanguage::TypeScript.extensions(),
            Arc::new(TypeScriptExtractor::new()),
        );
        registry.register(
            Dialect::C.extensions(),
            Arc::new(CFamilyExtractor::new(Dialect::C)),
        );
        registry.register(
            Dialect::Cpp.extensions(),
            Arc::new(CFamilyExtractor::new(Dialect::Cpp)),
        );
        registry
    }

    /// Associates `extractor` with each of `extensions`.
    ///
    /// Extensions are given without the leading dot and matched
    /// case-insensitively. A later registration replaces an earlier one.
    pub fn register(&mut self, extensions: &[&str], extractor: Arc<dyn SpanExtractor>) {
        for extension in extensions {
            let key = normalise_extension(extension);
            debug!(extension = %key, language = extractor.language(), "registering extractor");
            self.by_extension.insert(key, Arc::clone(&extractor));
        }
    }

    /// Returns the extractor registered for `extension`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::UnsupportedLanguage`] for unregistered
    /// extensions.
    pub fn for_extension(&self, extension: &str) -> Result<&dyn SpanExtractor, ExtractError> {
        self.by_extension
            .get(&normalise_extension(extension))
            .map(|extractor| extractor.as_ref())
            .ok_or_else(|| ExtractError::unsupported_language(extension))
    }

    /// Returns the extractor responsible for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::UnsupportedLanguage`] when the path has no
    /// extension or the extension is unregistered.
    pub fn for_path(&self, path: &Path) -> Result<&dyn SpanExtractor, ExtractError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        self.for_extension(extension)
    }

    /// Returns whether an extractor is registered for `path`.
    #[must_use]
    pub fn supports(&self, path: &Path) -> bool {
        self.for_path(path).is_ok()
    }

    /// Returns the registered extensions in sorted order.
    #[must_use]
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.by_extension.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}

fn normalise_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct LineExtractor;

    impl SpanExtractor for LineExtractor {
        fn language(&self) -> &'static str {
            "lines"
        }

        fn scope_separator(&self) -> &'static str {
            "."
        }

        fn extract(&self, source: &str, name: &str) -> Result<Span, ExtractError> {
            let start = source.find(name).ok_or_else(|| ExtractError::not_found(name))?;
            let end = source
                .get(start..)
                .and_then(|rest| rest.find('\n'))
                .map_or(source.len(), |offset| start + offset);
            Span::from_source(source, name, start..end).ok_or_else(|| ExtractError::not_found(name))
        }

        fn list(&self, source: &str) -> Result<Vec<String>, ExtractError> {
            Ok(source.lines().map(str::to_owned).collect())
        }

        fn members(&self, _source: &str, _container: &str) -> Result<Vec<String>, ExtractError> {
            Ok(Vec::new())
        }
    }

    #[rstest]
    #[case("calc.py", "python")]
    #[case("lib.rs", "rust")]
    #[case("app.tsx", "typescript")]
    #[case("main.c", "c")]
    #[case("widget.HPP", "cpp")]
    fn defaults_cover_builtin_languages(#[case] path: &str, #[case] language: &str) {
        let registry = ExtractorRegistry::with_defaults();
        let extractor = registry.for_path(Path::new(path)).expect("extractor");
        assert_eq!(extractor.language(), language);
    }

    #[rstest]
    #[case("notes.md", "md")]
    #[case("Makefile", "")]
    fn unregistered_extensions_are_unsupported(#[case] path: &str, #[case] extension: &str) {
        let registry = ExtractorRegistry::with_defaults();
        let error = registry.for_path(Path::new(path)).err();
        assert_eq!(error, Some(ExtractError::unsupported_language(extension)));
    }

    #[test]
    fn new_languages_register_without_touching_defaults() {
        let mut registry = ExtractorRegistry::with_defaults();
        registry.register(&[".TXT"], Arc::new(LineExtractor));

        let extractor = registry.for_path(Path::new("notes.txt")).expect("extractor");
        let span = extractor.extract("alpha\nbeta\n", "beta").expect("span");
        assert_eq!(span.text(), "beta");
        assert!(registry.supports(Path::new("lib.rs")));
    }

    #[test]
    fn empty_registry_supports_nothing() {
        let registry = ExtractorRegistry::empty();
        assert!(!registry.supports(Path::new("calc.py")));
        assert!(registry.extensions().is_empty());
    }
}
