//! Rust items.

use tree_sitter::Node;

use super::tree::{self, Definition, Grammar};
use crate::error::ExtractError;
use crate::extractor::SpanExtractor;
use crate::language::SupportedLanguage;
use crate::span::Span;

const ITEM_KINDS: &[&str] = &[
    "function_item",
    "struct_item",
    "enum_item",
    "union_item",
    "trait_item",
    "type_item",
    "const_item",
    "static_item",
    "mod_item",
    "macro_definition",
];

const MEMBER_KINDS: &[&str] = &[
    "function_item",
    "function_signature_item",
    "const_item",
    "type_item",
    "associated_type",
];

/// Extracts items from Rust source.
///
/// Outer attributes and outer doc comments directly above an item are part
/// of its span. Associated functions, constants, and types of `impl` blocks
/// and trait definitions are addressed as `Type::member`; when several
/// `impl` blocks for one type define the same member the name is ambiguous.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustExtractor;

impl RustExtractor {
    /// Creates the extractor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Grammar for RustExtractor {
    const LANGUAGE: SupportedLanguage = SupportedLanguage::Rust;
    const SEPARATOR: &'static str = "::";

    fn top_level(root: Node<'_>, source: &str) -> Vec<Definition> {
        tree::top_level_nodes(root)
            .into_iter()
            .filter(|node| ITEM_KINDS.contains(&node.kind()))
            .filter_map(|node| {
                let name = tree::field_text(node, "name", source)?;
                Some(Definition::new(name, tree::span_range(node, source, is_prefix)))
            })
            .collect()
    }

    fn members(root: Node<'_>, source: &str, container: &str) -> Option<Vec<Definition>> {
        let bodies: Vec<Node<'_>> = tree::top_level_nodes(root)
            .into_iter()
            .filter(|node| container_name(*node, source).as_deref() == Some(container))
            .filter_map(|node| node.child_by_field_name("body"))
            .collect();
        if bodies.is_empty() {
            return None;
        }

        let members = bodies
            .into_iter()
            .flat_map(tree::named_children)
            .filter(|node| MEMBER_KINDS.contains(&node.kind()))
            .filter_map(|node| {
                let name = tree::field_text(node, "name", source)?;
                Some(Definition::new(
                    tree::qualify(container, Self::SEPARATOR, &name),
                    tree::span_range(node, source, is_prefix),
                ))
            })
            .collect();
        Some(members)
    }
}

/// The type an `impl` block or trait definition provides members for.
fn container_name(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "impl_item" => node
            .child_by_field_name("type")
            .and_then(|ty| base_type_name(ty, source)),
        "trait_item" => tree::field_text(node, "name", source),
        _ => None,
    }
}

/// Strips generics and paths: `Wrapper<T>` and `shapes::Circle` name
/// `Wrapper` and `Circle`.
fn base_type_name(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "type_identifier" | "primitive_type" => Some(tree::text(node, source).to_owned()),
        "generic_type" => node
            .child_by_field_name("type")
            .and_then(|inner| base_type_name(inner, source)),
        "scoped_type_identifier" => tree::field_text(node, "name", source),
        _ => None,
    }
}

fn is_prefix(node: Node<'_>, source: &str) -> bool {
    match node.kind() {
        "attribute_item" => true,
        "line_comment" | "block_comment" => is_outer_doc_comment(tree::text(node, source)),
        _ => false,
    }
}

fn is_outer_doc_comment(comment: &str) -> bool {
    if let Some(rest) = comment.strip_prefix("///") {
        return !rest.starts_with('/');
    }
    comment
        .strip_prefix("/**")
        .is_some_and(|rest| !rest.starts_with('*') && !rest.starts_with('/'))
}

impl SpanExtractor for RustExtractor {
    fn language(&self) -> &'static str {
        Self::LANGUAGE.as_str()
    }

    fn scope_separator(&self) -> &'static str {
        Self::SEPARATOR
    }

    fn extract(&self, source: &str, name: &str) -> Result<Span, ExtractError> {
        tree::extract::<Self>(source, name)
    }

    fn list(&self, source: &str) -> Result<Vec<String>, ExtractError> {
        tree::list::<Self>(source)
    }

    fn members(&self, source: &str, container: &str) -> Result<Vec<String>, ExtractError> {
        tree::members::<Self>(source, container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/// docs", true)]
    #[case("/** docs */", true)]
    #[case("//// banner", false)]
    #[case("// plain", false)]
    #[case("//! inner", false)]
    #[case("/*** banner */", false)]
    #[case("/**/", false)]
    fn recognises_outer_doc_comments(#[case] comment: &str, #[case] expected: bool) {
        assert_eq!(is_outer_doc_comment(comment), expected);
    }
}
