//! Heuristic extraction for C and C++.
//!
//! No grammar is bundled for these languages, so definitions are found by
//! balancing braces and parentheses while skipping comments, string and
//! character literals, then classifying each top-level statement by its
//! keywords. The scanner accepts false boundaries on pathological input:
//! braces in `#if` branches that do not balance on their own, and macros
//! that expand to definitions (`TEST(Suite, Case) { ... }` reads as a
//! function named `TEST`).

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ExtractError;
use crate::extractor::SpanExtractor;
use crate::span::Span;

const SEPARATOR: &str = "::";

/// Words whose parenthesised argument never names a function.
const ATTRIBUTE_WORDS: &[&str] = &[
    "__attribute__",
    "__attribute",
    "__declspec",
    "alignas",
    "_Alignas",
    "decltype",
];

/// Control-flow words that can precede a parenthesis but never name a
/// definition.
const KEYWORDS: &[&str] = &[
    "if", "while", "for", "switch", "return", "sizeof", "catch", "do", "else", "case", "goto",
    "break", "continue", "default", "const", "volatile", "static", "extern", "inline",
];

/// Statements that declare nothing addressable.
const SKIPPED_PREFIXES: &[&str] = &["using namespace", "friend", "static_assert", "return"];

static RECORD_HEAD: Lazy<Regex> = Lazy::new(|| {
    compile_regex(concat!(
        r"(?s)^(?P<typedef>typedef\s+)?(?:(?:inline|export)\s+)?",
        r"(?P<kind>struct|class|union|enum(?:\s+(?:class|struct))?|namespace)\b",
        r"(?:\s*\[\[.*?\]\])*",
        r"(?:\s*(?:alignas|__attribute__|__declspec)\s*\((?:[^()]|\([^()]*\))*\))*",
        r"\s*(?P<tag>[A-Za-z_]\w*(?:::[A-Za-z_]\w*)*)?\s*(?P<rest>.*)$",
    ))
});

static TRANSPARENT_HEAD: Lazy<Regex> =
    Lazy::new(|| compile_regex(r#"^(?:extern\s*"[^"]*"|(?:inline\s+)?namespace)$"#));

static FORWARD_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    compile_regex(r"^(?:struct|class|union|enum(?:\s+(?:class|struct))?)\s+[A-Za-z_][\w:]*$")
});

static FUNCTION_NAME: Lazy<Regex> = Lazy::new(|| {
    compile_regex(concat!(
        r"(?P<name>(?:[A-Za-z_]\w*\s*(?:<[^<>;{}()]*>)?\s*::\s*)*~?\s*",
        r"(?:operator\s*(?:\(\s*\)|\[\s*\]|[^\s\w()]+|[A-Za-z_][\w\s]*?)|[A-Za-z_]\w*))\s*$",
    ))
});

static DEFINE: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"^#\s*define\s+(?P<name>[A-Za-z_]\w*)"));

static TYPEDEF_POINTER: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"\(\s*\*\s*(?P<name>[A-Za-z_]\w*)\s*\)"));

static USING_ALIAS: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"^using\s+(?P<name>[A-Za-z_]\w*)\s*$"));

static ACCESS_SPECIFIER: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"^(?:public|private|protected)\s*:"));

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| compile_regex(r"[A-Za-z_]\w*"));

static TRAILING_BRACKETS: Lazy<Regex> =
    Lazy::new(|| compile_regex(r"(?:\s*\[[^\]]*\])+\s*$"));

static SCOPE_SPACING: Lazy<Regex> = Lazy::new(|| compile_regex(r"\s*::\s*"));

static QUALIFIER_TEMPLATE_ARGS: Lazy<Regex> = Lazy::new(|| compile_regex(r"<[^<>]*>::"));

fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        // Every pattern is a literal compiled by the `patterns_compile` test.
        Err(err) => panic!("invalid regex pattern `{pattern}`: {err}"),
    }
}

/// The C-family language a [`CFamilyExtractor`] scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// C sources and headers (`.c`, `.h`).
    C,
    /// C++ sources and headers (`.cpp`, `.hpp`, `.cc`, `.cxx`, `.hxx`).
    Cpp,
}

impl Dialect {
    /// Returns the file extensions claimed by this dialect.
    #[must_use]
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::C => &["c", "h"],
            Self::Cpp => &["cpp", "hpp", "cc", "cxx", "hxx"],
        }
    }

    /// Returns the lower-case identifier for this dialect.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "cpp",
        }
    }
}

/// Brace-balancing extractor for C and C++.
///
/// Recognises function definitions (including out-of-class `Type::method`
/// definitions), `struct`/`class`/`union`/`enum` definitions with their
/// trailing declarators, named namespaces, `typedef`s, `#define`s with line
/// continuations, and global variables. `extern "C"` blocks and anonymous
/// namespaces are transparent. Members of records and namespaces are
/// addressed as `Container::member`.
#[derive(Debug, Clone, Copy)]
pub struct CFamilyExtractor {
    dialect: Dialect,
}

impl CFamilyExtractor {
    /// Creates an extractor for `dialect`.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Returns the dialect this extractor was created for.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn parse_error(self) -> ExtractError {
        ExtractError::parse(self.dialect.as_str(), "unbalanced braces")
    }
}

impl SpanExtractor for CFamilyExtractor {
    fn language(&self) -> &'static str {
        self.dialect.as_str()
    }

    fn scope_separator(&self) -> &'static str {
        SEPARATOR
    }

    fn extract(&self, source: &str, name: &str) -> Result<Span, ExtractError> {
        let top = scan(source, 0..source.len());
        let mut candidates: Vec<Item> = top
            .items
            .iter()
            .filter(|item| item.name == name)
            .cloned()
            .collect();

        if candidates.is_empty() {
            if let Some((container, _)) = name.rsplit_once(SEPARATOR) {
                candidates = members(source, &top.items, container)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|item| item.name == name)
                    .collect();
            }
        }

        match candidates.as_slice() {
            [] if top.unbalanced => Err(self.parse_error()),
            [] => Err(ExtractError::not_found(name)),
            [item] => Span::from_source(source, name, item.range.clone())
                .ok_or_else(|| self.parse_error()),
            many => Err(ExtractError::ambiguous(name, many.len())),
        }
    }

    fn list(&self, source: &str) -> Result<Vec<String>, ExtractError> {
        Ok(unique_names(scan(source, 0..source.len()).items))
    }

    fn members(&self, source: &str, container: &str) -> Result<Vec<String>, ExtractError> {
        let top = scan(source, 0..source.len());
        Ok(unique_names(
            members(source, &top.items, container).unwrap_or_default(),
        ))
    }
}

#[derive(Debug, Clone)]
struct Item {
    name: String,
    range: Range<usize>,
    body: Option<Range<usize>>,
}

#[derive(Debug, Default)]
struct Scan {
    items: Vec<Item>,
    unbalanced: bool,
}

impl Scan {
    fn push(&mut self, name: String, range: Range<usize>, body: Option<Range<usize>>) {
        if self.items.iter().any(|item| item.name == name && item.range == range) {
            return;
        }
        self.items.push(Item { name, range, body });
    }
}

fn unique_names(items: Vec<Item>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !names.contains(&item.name) {
            names.push(item.name);
        }
    }
    names
}

/// Members of the record or namespace at the `::`-separated `container`
/// path, plus out-of-line definitions such as `Widget::draw`.
fn members(source: &str, top: &[Item], container: &str) -> Option<Vec<Item>> {
    let prefix = format!("{container}{SEPARATOR}");
    let out_of_line: Vec<Item> = top
        .iter()
        .filter(|item| {
            item.name
                .strip_prefix(&prefix)
                .is_some_and(|member| !member.is_empty() && !member.contains(SEPARATOR))
        })
        .cloned()
        .collect();

    let nested = nested_items(source, top, container).map(|items| {
        items
            .into_iter()
            .map(|item| Item {
                name: format!("{prefix}{}", item.name),
                ..item
            })
            .collect::<Vec<_>>()
    });

    match nested {
        Some(mut items) => {
            items.extend(out_of_line);
            Some(items)
        }
        None if out_of_line.is_empty() => None,
        None => Some(out_of_line),
    }
}

fn nested_items(source: &str, top: &[Item], container: &str) -> Option<Vec<Item>> {
    let mut scope = top.to_vec();
    for segment in container.split(SEPARATOR) {
        let body = scope
            .iter()
            .find(|item| item.name == segment && item.body.is_some())
            .and_then(|item| item.body.clone())?;
        scope = scan(source, body).items;
    }
    Some(scope)
}

/// Scans `region` of `source` for definitions at that nesting level.
fn scan(source: &str, region: Range<usize>) -> Scan {
    let bytes = source.as_bytes();
    let mut found = Scan::default();
    let mut pos = region.start;
    while let Some(start) = skip_trivia(bytes, pos, region.end) {
        pos = match at(bytes, start) {
            b'#' => {
                let end = directive_end(bytes, start, region.end);
                if let Some(name) = DEFINE
                    .captures(text(source, start..end))
                    .and_then(|caps| caps.name("name"))
                {
                    found.push(
                        name.as_str().to_owned(),
                        start..trim_end(bytes, start, end),
                        None,
                    );
                }
                end
            }
            b';' | b'}' => start + 1,
            _ => scan_statement(source, start, region.end, &mut found),
        };
    }
    found
}

fn scan_statement(source: &str, start: usize, limit: usize, found: &mut Scan) -> usize {
    let bytes = source.as_bytes();
    if let Some(matched) = ACCESS_SPECIFIER.find(text(source, start..limit)) {
        return start + matched.end();
    }

    let header = scan_header(bytes, start, limit);
    match header.terminator {
        Terminator::Brace(open) => {
            let Some(close) = matching(bytes, open, limit, b'{', b'}') else {
                found.unbalanced = true;
                return limit;
            };
            braced_statement(source, start..open, close, limit, found)
        }
        Terminator::Semicolon(semi) => {
            let declaration = header
                .initializer
                .map_or(start..semi, |equals| start..equals);
            for name in declared_names(text(source, declaration), text(source, start..semi)) {
                found.push(name, start..semi + 1, None);
            }
            semi + 1
        }
        Terminator::End => limit,
    }
}

/// Handles a statement whose header `head` is followed by a brace group
/// closing at `close`; returns where scanning resumes.
fn braced_statement(
    source: &str,
    head: Range<usize>,
    close: usize,
    limit: usize,
    found: &mut Scan,
) -> usize {
    let start = head.start;
    let open = head.end;
    let head_text = strip_template_prefix(text(source, head).trim());

    if TRANSPARENT_HEAD.is_match(head_text) {
        let inner = scan(source, open + 1..close);
        found.unbalanced |= inner.unbalanced;
        found.items.extend(inner.items);
        return close + 1;
    }

    if let Some(record) = RECORD_HEAD.captures(head_text) {
        let rest = record.name("rest").map_or("", |rest| rest.as_str());
        if rest.is_empty() || rest.starts_with(':') || rest.starts_with("final") {
            let is_namespace = record
                .name("kind")
                .is_some_and(|kind| kind.as_str() == "namespace");
            let (end, trailing) = if is_namespace {
                (close + 1, "")
            } else {
                record_end(source, close, limit)
            };
            let body = Some(open + 1..close);
            let tag = record.name("tag").map(|tag| tag.as_str().to_owned());
            if let Some(tag_name) = &tag {
                found.push(tag_name.clone(), start..end, body.clone());
            }
            for alias in declarator_names(trailing) {
                if tag.as_deref() != Some(alias.as_str()) {
                    found.push(alias, start..end, body.clone());
                }
            }
            return end;
        }
    }

    if let Some(name) = function_name(head_text) {
        found.push(name, start..close + 1, None);
    }
    close + 1
}

/// Where a record definition ends: after the `;` that closes its trailing
/// declarators, together with the declarator text.
fn record_end(source: &str, close: usize, limit: usize) -> (usize, &str) {
    let header = scan_header(source.as_bytes(), close + 1, limit);
    match header.terminator {
        Terminator::Semicolon(semi) => (semi + 1, text(source, close + 1..semi)),
        Terminator::Brace(_) | Terminator::End => (close + 1, ""),
    }
}

/// Names introduced by a `;`-terminated statement. `declaration` is the
/// statement up to its first initializer, `statement` the whole of it.
fn declared_names(declaration: &str, statement: &str) -> Vec<String> {
    let head = strip_template_prefix(declaration.trim());
    if let Some(rest) = head
        .strip_prefix("typedef")
        .filter(|rest| rest.starts_with(char::is_whitespace))
    {
        return typedef_name(rest).into_iter().collect();
    }
    if let Some(alias) = USING_ALIAS.captures(head).and_then(|caps| caps.name("name")) {
        return vec![alias.as_str().to_owned()];
    }
    if head.starts_with("using")
        || SKIPPED_PREFIXES.iter().any(|prefix| head.starts_with(prefix))
        || FORWARD_DECLARATION.is_match(head)
        || head.contains('(')
    {
        return Vec::new();
    }
    declarator_names(statement)
}

fn typedef_name(declaration: &str) -> Option<String> {
    if let Some(name) = TYPEDEF_POINTER
        .captures(declaration)
        .and_then(|caps| caps.name("name"))
    {
        return Some(name.as_str().to_owned());
    }
    last_identifier(declaration)
}

/// The declarator names of a declaration list such as `int a = 1, *b[4]`.
fn declarator_names(declarations: &str) -> Vec<String> {
    split_top_level(declarations, b',')
        .into_iter()
        .filter_map(|segment| {
            let declarator = split_top_level(segment, b'=').into_iter().next()?;
            if declarator.contains('(') {
                return None;
            }
            last_identifier(declarator)
        })
        .collect()
}

fn last_identifier(declarator: &str) -> Option<String> {
    let stripped = TRAILING_BRACKETS.replace(declarator, "");
    IDENTIFIER
        .find_iter(&stripped)
        .last()
        .map(|name| name.as_str().to_owned())
        .filter(|name| !KEYWORDS.contains(&name.as_str()))
}

/// Splits `input` at `delimiter` where it is not nested in brackets.
fn split_top_level(input: &str, delimiter: u8) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut segment_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(next) = skip_non_code(bytes, i) {
            i = next;
            continue;
        }
        match at(bytes, i) {
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' | b'>' => depth = depth.saturating_sub(1),
            byte if byte == delimiter && depth == 0 && !is_compound_operator(bytes, i) => {
                parts.push(text(input, segment_start..i));
                segment_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(text(input, segment_start..bytes.len()));
    parts
}

fn is_compound_operator(bytes: &[u8], i: usize) -> bool {
    at(bytes, i) == b'=' && (at(bytes, i + 1) == b'=' || b"=!<>".contains(&prev(bytes, i)))
}

/// Name of the function whose definition starts with `head`, if any.
fn function_name(head: &str) -> Option<String> {
    let bytes = head.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(next) = skip_non_code(bytes, i) {
            i = next;
            continue;
        }
        match at(bytes, i) {
            b'[' => depth += 1,
            b']' => depth = depth.saturating_sub(1),
            b'(' if depth == 0 => {
                let before = head.get(..i)?;
                let word = trailing_word(before);
                let is_call_operator = word == "operator"
                    && head
                        .get(i + 1..)
                        .is_some_and(|rest| rest.trim_start().starts_with(')'));
                if ATTRIBUTE_WORDS.contains(&word) || is_call_operator {
                    i = matching(bytes, i, bytes.len(), b'(', b')')? + 1;
                    continue;
                }
                let name = FUNCTION_NAME.captures(before)?.name("name")?.as_str();
                let normalised = normalise_qualified(name);
                if normalised.is_empty() || KEYWORDS.contains(&normalised.as_str()) {
                    return None;
                }
                return Some(normalised);
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn trailing_word(text_before: &str) -> &str {
    let trimmed = text_before.trim_end();
    let start = trimmed
        .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .map_or(0, |index| index + 1);
    trimmed.get(start..).unwrap_or_default()
}

/// `Box<T> :: get` becomes `Box::get`.
fn normalise_qualified(name: &str) -> String {
    let spaced = SCOPE_SPACING.replace_all(name.trim(), SEPARATOR);
    QUALIFIER_TEMPLATE_ARGS
        .replace_all(&spaced, SEPARATOR)
        .trim()
        .to_owned()
}

enum Terminator {
    Brace(usize),
    Semicolon(usize),
    End,
}

struct Header {
    terminator: Terminator,
    initializer: Option<usize>,
}

/// Scans a statement header up to the `{` or `;` that ends it.
///
/// Brace groups that belong to an initializer (`= { 1, 2 }`, lambdas) or to
/// a constructor's member initializer list (`: value_{v}`) are skipped.
fn scan_header(bytes: &[u8], start: usize, limit: usize) -> Header {
    let mut depth = 0usize;
    let mut initializer = None;
    let mut after_parameters = false;
    let mut in_initializer_list = false;
    let mut i = skip_template_parameters(bytes, start, limit);
    while i < limit {
        if let Some(next) = skip_non_code(bytes, i) {
            i = next;
            continue;
        }
        match at(bytes, i) {
            b'(' | b'[' => depth += 1,
            b')' | b']' => {
                depth = depth.saturating_sub(1);
                after_parameters |= depth == 0 && at(bytes, i) == b')';
            }
            b';' if depth == 0 => {
                return Header {
                    terminator: Terminator::Semicolon(i),
                    initializer,
                };
            }
            b'{' if depth == 0 => {
                let is_value = initializer.is_some()
                    || (in_initializer_list && is_member_initializer(bytes, start, i));
                if !is_value {
                    return Header {
                        terminator: Terminator::Brace(i),
                        initializer,
                    };
                }
                i = matching(bytes, i, limit, b'{', b'}').map_or(limit, |close| close + 1);
                continue;
            }
            b':' if depth == 0
                && after_parameters
                && at(bytes, i + 1) != b':'
                && prev(bytes, i) != b':' =>
            {
                in_initializer_list = true;
            }
            b'=' if depth == 0 && initializer.is_none() && is_assignment(bytes, start, i) => {
                initializer = Some(i);
            }
            _ => {}
        }
        i += 1;
    }
    Header {
        terminator: Terminator::End,
        initializer,
    }
}

fn is_assignment(bytes: &[u8], start: usize, i: usize) -> bool {
    if at(bytes, i + 1) == b'=' || b"=!<>+-*/%&|^~".contains(&prev(bytes, i)) {
        return false;
    }
    let before = bytes.get(start..i).unwrap_or_default();
    let word_end = before
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map_or(0, |index| index + 1);
    let trimmed = before.get(..word_end).unwrap_or_default();
    !(trimmed.ends_with(b"operator") && !is_ident_byte(at(trimmed, word_end.wrapping_sub(9))))
}

fn is_member_initializer(bytes: &[u8], start: usize, brace: usize) -> bool {
    let before = bytes.get(start..brace).unwrap_or_default();
    before
        .iter()
        .rev()
        .find(|byte| !byte.is_ascii_whitespace())
        .is_some_and(|byte| is_ident_byte(*byte) || *byte == b'>')
}

/// Skips a leading `template <...>` parameter list.
fn skip_template_parameters(bytes: &[u8], start: usize, limit: usize) -> usize {
    let mut pos = start;
    loop {
        let keyword_end = pos + "template".len();
        let is_template = bytes.get(pos..keyword_end) == Some(b"template".as_slice())
            && !is_ident_byte(at(bytes, keyword_end));
        if !is_template {
            return pos;
        }
        let Some(open) = skip_trivia(bytes, keyword_end, limit).filter(|i| at(bytes, *i) == b'<')
        else {
            return pos;
        };
        let Some(close) = matching(bytes, open, limit, b'<', b'>') else {
            return pos;
        };
        pos = skip_trivia(bytes, close + 1, limit).unwrap_or(limit);
    }
}

fn strip_template_prefix(head: &str) -> &str {
    let start = skip_template_parameters(head.as_bytes(), 0, head.len());
    head.get(start..).unwrap_or(head).trim_start()
}

/// End of a preprocessor directive, following backslash continuations.
fn directive_end(bytes: &[u8], start: usize, limit: usize) -> usize {
    let mut i = start;
    while i < limit {
        if at(bytes, i) == b'\n' {
            let continued = prev(bytes, i) == b'\\'
                || (prev(bytes, i) == b'\r' && i >= 2 && at(bytes, i - 2) == b'\\');
            if !continued {
                return i;
            }
        }
        i += 1;
    }
    limit
}

fn trim_end(bytes: &[u8], start: usize, end: usize) -> usize {
    let mut trimmed = end;
    while trimmed > start && at(bytes, trimmed - 1).is_ascii_whitespace() {
        trimmed -= 1;
    }
    trimmed
}

/// First position at or after `pos` that is neither whitespace nor a
/// comment, or `None` once `limit` is reached.
fn skip_trivia(bytes: &[u8], pos: usize, limit: usize) -> Option<usize> {
    let mut i = pos;
    while i < limit {
        let byte = at(bytes, i);
        if byte.is_ascii_whitespace() {
            i += 1;
        } else if byte == b'/' && matches!(at(bytes, i + 1), b'/' | b'*') {
            i = skip_non_code(bytes, i).unwrap_or(limit);
        } else {
            return Some(i);
        }
    }
    None
}

/// If a comment or literal starts at `i`, returns the position after it.
fn skip_non_code(bytes: &[u8], i: usize) -> Option<usize> {
    match (at(bytes, i), at(bytes, i + 1)) {
        (b'/', b'/') => Some(find(bytes, i, b"\n").unwrap_or(bytes.len())),
        (b'/', b'*') => Some(find(bytes, i + 2, b"*/").map_or(bytes.len(), |end| end + 2)),
        (b'"', _) if is_raw_string(bytes, i) => Some(skip_raw_string(bytes, i)),
        (b'"', _) => Some(skip_quoted(bytes, i, b'"')),
        (b'\'', _) if !prev(bytes, i).is_ascii_digit() => Some(skip_quoted(bytes, i, b'\'')),
        _ => None,
    }
}

fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    let mut i = open + 1;
    while i < bytes.len() {
        match at(bytes, i) {
            b'\\' => i += 2,
            b'\n' => return i,
            byte if byte == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

const RAW_STRING_PREFIXES: &[&[u8]] = &[b"", b"u8", b"u", b"U", b"L"];

fn is_raw_string(bytes: &[u8], quote: usize) -> bool {
    let Some(r) = quote.checked_sub(1) else {
        return false;
    };
    if at(bytes, r) != b'R' {
        return false;
    }
    let prefix_start = (0..r)
        .rev()
        .take_while(|index| is_ident_byte(at(bytes, *index)))
        .last()
        .unwrap_or(r);
    bytes
        .get(prefix_start..r)
        .is_some_and(|prefix| RAW_STRING_PREFIXES.contains(&prefix))
}

fn skip_raw_string(bytes: &[u8], quote: usize) -> usize {
    let Some(paren) = find(bytes, quote + 1, b"(") else {
        return bytes.len();
    };
    let mut terminator = Vec::with_capacity(paren - quote + 1);
    terminator.push(b')');
    terminator.extend_from_slice(bytes.get(quote + 1..paren).unwrap_or_default());
    terminator.push(b'"');
    find(bytes, paren + 1, &terminator).map_or(bytes.len(), |end| end + terminator.len())
}

/// Position of the delimiter closing the one opened at `open`.
fn matching(bytes: &[u8], open: usize, limit: usize, opener: u8, closer: u8) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < limit {
        if let Some(next) = skip_non_code(bytes, i) {
            i = next;
            continue;
        }
        let byte = at(bytes, i);
        if byte == opener {
            depth += 1;
        } else if byte == closer {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn at(bytes: &[u8], i: usize) -> u8 {
    bytes.get(i).copied().unwrap_or(0)
}

fn prev(bytes: &[u8], i: usize) -> u8 {
    i.checked_sub(1).map_or(0, |before| at(bytes, before))
}

const fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn text(source: &str, range: Range<usize>) -> &str {
    source.get(range).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn patterns_compile() {
        for pattern in [
            &RECORD_HEAD,
            &TRANSPARENT_HEAD,
            &FORWARD_DECLARATION,
            &FUNCTION_NAME,
            &DEFINE,
            &TYPEDEF_POINTER,
            &USING_ALIAS,
            &ACCESS_SPECIFIER,
            &IDENTIFIER,
            &TRAILING_BRACKETS,
            &SCOPE_SPACING,
            &QUALIFIER_TEMPLATE_ARGS,
        ] {
            assert!(!pattern.as_str().is_empty());
        }
    }

    #[rstest]
    #[case("int main(void)", Some("main"))]
    #[case("static inline int add(int a, int b)", Some("add"))]
    #[case("void Widget :: draw() const", Some("Widget::draw"))]
    #[case("Widget::~Widget()", Some("Widget::~Widget"))]
    #[case("T Box<T>::get()", Some("Box::get"))]
    #[case("bool operator==(const A& a, const A& b)", Some("operator=="))]
    #[case("int operator()(int x)", Some("operator()"))]
    #[case("__attribute__((noreturn)) void fail(void)", Some("fail"))]
    #[case("if (ready)", None)]
    #[case("struct point", None)]
    fn function_names(#[case] head: &str, #[case] expected: Option<&str>) {
        assert_eq!(function_name(head).as_deref(), expected);
    }

    #[rstest]
    #[case("int counter = 0", vec!["counter"])]
    #[case("static const char *names[4]", vec!["names"])]
    #[case("int a = 1, *b", vec!["a", "b"])]
    #[case("std::map<int, int> table", vec!["table"])]
    fn declarators(#[case] declarations: &str, #[case] expected: Vec<&str>) {
        assert_eq!(declarator_names(declarations), expected);
    }

    #[rstest]
    #[case("typedef unsigned long size_type", Some("size_type"))]
    #[case("typedef int (*callback)(int)", Some("callback"))]
    #[case("typedef int matrix[4][4]", Some("matrix"))]
    fn typedefs(#[case] declaration: &str, #[case] expected: Option<&str>) {
        let rest = declaration.strip_prefix("typedef").unwrap_or(declaration);
        assert_eq!(typedef_name(rest).as_deref(), expected);
    }

    #[test]
    fn raw_strings_hide_braces() {
        let source = "const char *s = R\"x(}{)x\";\nint after = 1;\n";
        let names: Vec<String> = scan(source, 0..source.len())
            .items
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["s", "after"]);
    }

    #[test]
    fn digit_separators_are_not_character_literals() {
        let source = "long big = 1'000'000;\nint next = 2;\n";
        let names: Vec<String> = scan(source, 0..source.len())
            .items
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["big", "next"]);
    }
}
