//! Python definitions.

use tree_sitter::Node;

use super::tree::{self, Definition, Grammar};
use crate::error::ExtractError;
use crate::extractor::SpanExtractor;
use crate::language::SupportedLanguage;
use crate::span::Span;

/// Extracts functions, classes, and module-level assignments from Python.
///
/// Decorators belong to the definition they decorate, and a docstring is
/// part of the body, so both fall inside the span. Members are addressed
/// as `Class.method`, nesting as deep as the classes do.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonExtractor;

impl PythonExtractor {
    /// Creates the extractor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Grammar for PythonExtractor {
    const LANGUAGE: SupportedLanguage = SupportedLanguage::Python;
    const SEPARATOR: &'static str = ".";

    fn top_level(root: Node<'_>, source: &str) -> Vec<Definition> {
        tree::top_level_nodes(root)
            .into_iter()
            .filter_map(|node| definition(node, source))
            .collect()
    }

    fn members(root: Node<'_>, source: &str, container: &str) -> Option<Vec<Definition>> {
        let body = find_class_body(root, source, container)?;
        let members = tree::named_children(body)
            .into_iter()
            .filter_map(|node| definition(node, source))
            .map(|member| {
                Definition::new(
                    tree::qualify(container, Self::SEPARATOR, &member.name),
                    member.range,
                )
            })
            .collect();
        Some(members)
    }
}

/// The name and span of `node` when it defines something.
fn definition(node: Node<'_>, source: &str) -> Option<Definition> {
    let name = defined_name(node, source)?;
    Some(Definition::new(name, node.byte_range()))
}

fn defined_name(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "function_definition" | "class_definition" => tree::field_text(node, "name", source),
        "decorated_definition" => node
            .child_by_field_name("definition")
            .and_then(|inner| defined_name(inner, source)),
        "expression_statement" => {
            let assignment = node.named_child(0).filter(|n| n.kind() == "assignment")?;
            let target = assignment
                .child_by_field_name("left")
                .filter(|left| left.kind() == "identifier")?;
            Some(tree::text(target, source).to_owned())
        }
        _ => None,
    }
}

/// The underlying class node, looking through decorators.
fn class_node(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "class_definition" => Some(node),
        "decorated_definition" => node
            .child_by_field_name("definition")
            .filter(|inner| inner.kind() == "class_definition"),
        _ => None,
    }
}

/// Follows a dotted path such as `Outer.Inner` down to the class body.
fn find_class_body<'t>(root: Node<'t>, source: &str, path: &str) -> Option<Node<'t>> {
    let mut scope = tree::top_level_nodes(root);
    let mut body = None;
    for segment in path.split('.') {
        let class = scope.into_iter().filter_map(class_node).find(|class| {
            tree::field_text(*class, "name", source).as_deref() == Some(segment)
        })?;
        let block = class.child_by_field_name("body")?;
        scope = tree::named_children(block);
        body = Some(block);
    }
    body
}

impl SpanExtractor for PythonExtractor {
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
