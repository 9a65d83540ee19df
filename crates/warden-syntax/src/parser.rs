//! Thin Tree-sitter wrapper used by the syntax-tree extractors.
//!
//! Trees with ERROR or MISSING nodes are still returned: intact definitions
//! stay addressable, and the first broken location is only reported when a
//! lookup comes up empty.

use crate::error::ExtractError;
use crate::language::SupportedLanguage;
use crate::position::point_to_one_based;

/// A parsed source file together with the grammar that produced it.
#[derive(Debug)]
pub(crate) struct ParsedSource {
    tree: tree_sitter::Tree,
    language: SupportedLanguage,
}

impl ParsedSource {
    /// Parses `source` with the grammar for `language`.
    pub(crate) fn parse(language: SupportedLanguage, source: &str) -> Result<Self, ExtractError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|err| ExtractError::parser_init(language.as_str(), err.to_string()))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::parse(language.as_str(), "parsing failed"))?;
        Ok(Self { tree, language })
    }

    pub(crate) fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    pub(crate) fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// The parse error describing the first broken node, in source order.
    pub(crate) fn to_extract_error(&self) -> ExtractError {
        let message = first_broken_node(self.tree.root_node()).map_or_else(
            || "syntax error".to_owned(),
            |node| {
                let (line, column) = point_to_one_based(node.start_position());
                let what = if node.is_missing() {
                    format!("missing {}", node.kind())
                } else {
                    "syntax error".to_owned()
                };
                format!("{what} at line {line}, column {column}")
            },
        );
        ExtractError::parse(self.language.as_str(), message)
    }
}

fn first_broken_node(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_broken_node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SupportedLanguage::Rust, "fn main() {}")]
    #[case(SupportedLanguage::Python, "def hello():\n    pass")]
    #[case(SupportedLanguage::TypeScript, "const view = <div>{label}</div>;")]
    fn clean_sources_have_no_errors(#[case] language: SupportedLanguage, #[case] source: &str) {
        let parsed = ParsedSource::parse(language, source).expect("parse");
        assert!(!parsed.has_errors());
    }

    #[rstest]
    #[case(SupportedLanguage::Rust, "fn broken() {")]
    #[case(SupportedLanguage::Python, "def broken(")]
    #[case(SupportedLanguage::TypeScript, "function broken( {")]
    fn broken_sources_are_still_parsed(#[case] language: SupportedLanguage, #[case] source: &str) {
        let parsed = ParsedSource::parse(language, source).expect("parse");
        assert!(parsed.has_errors());
    }

    #[test]
    fn extract_error_names_the_first_location() {
        let parsed =
            ParsedSource::parse(SupportedLanguage::Rust, "fn test() {\n    let x = \n}")
                .expect("parse");

        let ExtractError::Parse { language, message } = parsed.to_extract_error() else {
            panic!("expected a parse error");
        };
        assert_eq!(language, "rust");
        assert!(message.contains("at line"), "unexpected message: {message}");
    }
}
