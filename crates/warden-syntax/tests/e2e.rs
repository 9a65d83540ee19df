//! End-to-end tests for warden-syntax through the public registry API.
//!
//! These tests pick extractors by file name, the way the protection engine
//! does, and check both happy and unhappy paths.

use std::path::Path;
use std::sync::Arc;

use insta::assert_debug_snapshot;
use rstest::{fixture, rstest};

use warden_syntax::{ExtractError, ExtractorRegistry, PythonExtractor, SpanExtractor};

/// Fixture providing the default registry.
#[fixture]
fn registry() -> ExtractorRegistry {
    ExtractorRegistry::with_defaults()
}

// =============================================================================
// Happy Path
// =============================================================================

#[rstest]
#[case("src/calc.py", "def calc():\n    return 1\n", "calc", "def calc():\n    return 1")]
#[case("src/lib.rs", "pub fn calc() -> u8 {\n    1\n}\n", "calc", "pub fn calc() -> u8 {\n    1\n}")]
#[case("web/app.tsx", "export const calc = () => 1;\n", "calc", "export const calc = () => 1;")]
#[case("native/calc.c", "int calc(void) {\n    return 1;\n}\n", "calc", "int calc(void) {\n    return 1;\n}")]
fn extracts_through_registry(
    registry: ExtractorRegistry,
    #[case] path: &str,
    #[case] source: &str,
    #[case] name: &str,
    #[case] expected: &str,
) {
    let extractor = registry
        .for_path(Path::new(path))
        .unwrap_or_else(|err| panic!("extractor for {path}: {err}"));
    let span = extractor
        .extract(source, name)
        .unwrap_or_else(|err| panic!("extract: {err}"));

    assert_eq!(span.text(), expected);
    assert_eq!(span.start_line(), 1);
}

#[rstest]
fn span_reports_lines_and_range(registry: ExtractorRegistry) {
    let source = "import os\n\n\ndef first():\n    pass\n\n\ndef second():\n    return 2\n";
    let extractor = registry
        .for_path(Path::new("mod.py"))
        .unwrap_or_else(|err| panic!("extractor: {err}"));
    let span = extractor
        .extract(source, "second")
        .unwrap_or_else(|err| panic!("extract: {err}"));

    assert_debug_snapshot!(span, @r#"
    Span {
        name: "second",
        byte_range: 36..62,
        start_line: 8,
        end_line: 9,
        text: "def second():\n    return 2",
    }
    "#);
}

#[rstest]
fn listing_is_deterministic(registry: ExtractorRegistry) {
    let source = "def test_one():\n    pass\n\n\ndef helper():\n    pass\n\n\ndef test_two():\n    pass\n";
    let extractor = registry
        .for_path(Path::new("test_mod.py"))
        .unwrap_or_else(|err| panic!("extractor: {err}"));

    let first = extractor.list(source).unwrap_or_else(|err| panic!("list: {err}"));
    let second = extractor.list(source).unwrap_or_else(|err| panic!("list: {err}"));
    assert_eq!(first, second);
    assert_eq!(first, vec!["test_one", "helper", "test_two"]);
}

#[test]
fn registry_accepts_extra_languages() {
    let mut registry = ExtractorRegistry::empty();
    registry.register(&["pyx"], Arc::new(PythonExtractor::new()));

    let extractor = registry
        .for_path(Path::new("fast.pyx"))
        .unwrap_or_else(|err| panic!("extractor: {err}"));
    assert_eq!(extractor.language(), "python");
    assert!(!registry.supports(Path::new("slow.py")));
}

// =============================================================================
// Unhappy Path
// =============================================================================

#[rstest]
fn unknown_extension_is_unsupported(registry: ExtractorRegistry) {
    let error = registry.for_path(Path::new("README.md")).err();
    assert_debug_snapshot!(error, @r#"
    Some(
        UnsupportedLanguage {
            extension: "md",
        },
    )
    "#);
}

#[rstest]
fn renamed_definition_is_not_found(registry: ExtractorRegistry) {
    let extractor = registry
        .for_path(Path::new("calc.py"))
        .unwrap_or_else(|err| panic!("extractor: {err}"));
    let error = extractor.extract("def calc2():\n    return 1\n", "calc").err();
    assert_eq!(error, Some(ExtractError::not_found("calc")));
    assert_eq!(
        error.map(|err| err.to_string()),
        Some("identifier 'calc' not found".to_owned())
    );
}
