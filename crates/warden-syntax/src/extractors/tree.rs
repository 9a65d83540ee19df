//! Shared machinery for the Tree-sitter backed extractors.
//!
//! Each grammar only says how to read definitions out of its tree; lookup,
//! duplicate detection, and error reporting live here so every syntax-tree
//! extractor behaves the same way.

use std::collections::HashSet;
use std::ops::Range;

use tree_sitter::Node;

use crate::error::ExtractError;
use crate::language::SupportedLanguage;
use crate::parser::ParsedSource;
use crate::span::Span;

/// A definition reduced to its name and the byte range of its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Definition {
    pub(crate) name: String,
    pub(crate) range: Range<usize>,
}

impl Definition {
    pub(crate) const fn new(name: String, range: Range<usize>) -> Self {
        Self { name, range }
    }
}

/// How one Tree-sitter grammar exposes its definitions.
pub(crate) trait Grammar {
    const LANGUAGE: SupportedLanguage;
    const SEPARATOR: &'static str;

    /// Top-level definitions in source order.
    fn top_level(root: Node<'_>, source: &str) -> Vec<Definition>;

    /// Members of `container` with qualified names, or `None` when no
    /// container of that name exists.
    fn members(root: Node<'_>, source: &str, container: &str) -> Option<Vec<Definition>>;
}

fn parse<G: Grammar>(source: &str) -> Result<ParsedSource, ExtractError> {
    ParsedSource::parse(G::LANGUAGE, source)
}

pub(crate) fn extract<G: Grammar>(source: &str, name: &str) -> Result<Span, ExtractError> {
    let parsed = parse::<G>(source)?;
    let root = parsed.root_node();

    let mut candidates: Vec<Definition> = G::top_level(root, source)
        .into_iter()
        .filter(|definition| definition.name == name)
        .collect();

    if candidates.is_empty() {
        if let Some((container, _)) = name.rsplit_once(G::SEPARATOR) {
            candidates = G::members(root, source, container)
                .unwrap_or_default()
                .into_iter()
                .filter(|definition| definition.name == name)
                .collect();
        }
    }

    match candidates.as_slice() {
        [] if parsed.has_errors() => Err(parsed.to_extract_error()),
        [] => Err(ExtractError::not_found(name)),
        [definition] => Span::from_source(source, name, trim_trailing(source, &definition.range))
            .ok_or_else(|| ExtractError::parse(G::LANGUAGE.as_str(), "span outside source")),
        many => Err(ExtractError::ambiguous(name, many.len())),
    }
}

pub(crate) fn list<G: Grammar>(source: &str) -> Result<Vec<String>, ExtractError> {
    let parsed = parse::<G>(source)?;
    Ok(unique_names(G::top_level(parsed.root_node(), source)))
}

pub(crate) fn members<G: Grammar>(
    source: &str,
    container: &str,
) -> Result<Vec<String>, ExtractError> {
    let parsed = parse::<G>(source)?;
    let definitions = G::members(parsed.root_node(), source, container).unwrap_or_default();
    Ok(unique_names(definitions))
}

/// Drops trailing whitespace some grammars attach to the last token.
fn trim_trailing(source: &str, range: &Range<usize>) -> Range<usize> {
    let kept = source
        .get(range.clone())
        .map_or(range.len(), |text| text.trim_end().len());
    range.start..range.start + kept
}

fn unique_names(definitions: Vec<Definition>) -> Vec<String> {
    let mut seen = HashSet::new();
    definitions
        .into_iter()
        .filter_map(|definition| {
            seen.insert(definition.name.clone())
                .then_some(definition.name)
        })
        .collect()
}

/// Named children of `root`, looking through top-level ERROR nodes so that
/// intact definitions survive a syntax error elsewhere in the file.
pub(crate) fn top_level_nodes(root: Node<'_>) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.is_error() {
            let mut inner = child.walk();
            nodes.extend(child.named_children(&mut inner));
        } else {
            nodes.push(child);
        }
    }
    nodes
}

/// Named children of `node` in order.
pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

pub(crate) fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}

pub(crate) fn field_text(node: Node<'_>, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|child| text(child, source).to_owned())
        .filter(|name| !name.is_empty())
}

/// Start of `node`'s span once directly preceding prefix siblings
/// (decorators, attributes, doc comments) are included.
///
/// Walks backwards over siblings accepted by `is_prefix` while only
/// whitespace, blank lines included, separates them; the first sibling
/// that is not a prefix, or any other text in between, stops the walk.
pub(crate) fn leading_start(
    node: Node<'_>,
    source: &str,
    is_prefix: impl Fn(Node<'_>, &str) -> bool,
) -> usize {
    let mut start = node.start_byte();
    let mut current = node.prev_named_sibling();
    while let Some(sibling) = current {
        let gap_is_blank = source
            .get(sibling.end_byte()..start)
            .is_some_and(|gap| gap.trim().is_empty());
        if !gap_is_blank || !is_prefix(sibling, source) {
            break;
        }
        start = sibling.start_byte();
        current = sibling.prev_named_sibling();
    }
    start
}

/// Range from the prefix-adjusted start of `node` to its end.
pub(crate) fn span_range(
    node: Node<'_>,
    source: &str,
    is_prefix: impl Fn(Node<'_>, &str) -> bool,
) -> Range<usize> {
    leading_start(node, source, is_prefix)..node.end_byte()
}

pub(crate) fn qualify(container: &str, separator: &str, member: &str) -> String {
    format!("{container}{separator}{member}")
}
