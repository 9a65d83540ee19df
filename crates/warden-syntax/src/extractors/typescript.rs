//! TypeScript and TSX declarations.

use tree_sitter::Node;

use super::tree::{self, Definition, Grammar};
use crate::error::ExtractError;
use crate::extractor::SpanExtractor;
use crate::language::SupportedLanguage;
use crate::span::Span;

const NAMED_DECLARATIONS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "function_signature",
    "class_declaration",
    "abstract_class_declaration",
    "interface_declaration",
    "type_alias_declaration",
    "enum_declaration",
    "module",
    "internal_module",
];

const CONTAINER_KINDS: &[&str] = &[
    "class_declaration",
    "abstract_class_declaration",
    "interface_declaration",
];

const MEMBER_KINDS: &[&str] = &[
    "method_definition",
    "method_signature",
    "abstract_method_signature",
    "public_field_definition",
    "property_signature",
];

/// Extracts declarations from TypeScript and TSX source.
///
/// An `export` or `declare` wrapper belongs to the span of what it wraps,
/// as do decorators. Every declarator of a `const`/`let`/`var` statement
/// maps to the whole statement. Class and interface members are addressed
/// as `Class.member`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptExtractor;

impl TypeScriptExtractor {
    /// Creates the extractor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Grammar for TypeScriptExtractor {
    const LANGUAGE: SupportedLanguage = SupportedLanguage::TypeScript;
    const SEPARATOR: &'static str = ".";

    fn top_level(root: Node<'_>, source: &str) -> Vec<Definition> {
        tree::top_level_nodes(root)
            .into_iter()
            .flat_map(|node| {
                let range = node.byte_range();
                declared_names(node, source)
                    .into_iter()
                    .map(move |name| Definition::new(name, range.clone()))
            })
            .collect()
    }

    fn members(root: Node<'_>, source: &str, container: &str) -> Option<Vec<Definition>> {
        let body = tree::top_level_nodes(root)
            .into_iter()
            .filter_map(unwrap_declaration)
            .filter(|node| CONTAINER_KINDS.contains(&node.kind()))
            .find(|node| tree::field_text(*node, "name", source).as_deref() == Some(container))?
            .child_by_field_name("body")?;

        let members = tree::named_children(body)
            .into_iter()
            .filter(|node| MEMBER_KINDS.contains(&node.kind()))
            .filter_map(|node| {
                let name = tree::field_text(node, "name", source)?;
                Some(Definition::new(
                    tree::qualify(container, Self::SEPARATOR, &name),
                    tree::span_range(node, source, |sibling, _| sibling.kind() == "decorator"),
                ))
            })
            .collect();
        Some(members)
    }
}

/// Looks through `export`, `declare`, and statement wrappers to the
/// declaration inside.
fn unwrap_declaration(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "export_statement" => node
            .child_by_field_name("declaration")
            .and_then(unwrap_declaration),
        "ambient_declaration" | "expression_statement" => {
            node.named_child(0).and_then(unwrap_declaration)
        }
        _ => Some(node),
    }
}

fn declared_names(node: Node<'_>, source: &str) -> Vec<String> {
    let Some(declaration) = unwrap_declaration(node) else {
        return Vec::new();
    };
    match declaration.kind() {
        "lexical_declaration" | "variable_declaration" => tree::named_children(declaration)
            .into_iter()
            .filter(|child| child.kind() == "variable_declarator")
            .filter_map(|declarator| declarator.child_by_field_name("name"))
            .filter(|name| name.kind() == "identifier")
            .map(|name| tree::text(name, source).to_owned())
            .collect(),
        kind if NAMED_DECLARATIONS.contains(&kind) => {
            tree::field_text(declaration, "name", source).into_iter().collect()
        }
        _ => Vec::new(),
    }
}

impl SpanExtractor for TypeScriptExtractor {
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
