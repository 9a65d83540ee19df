//! The extracted region of a named definition.

use std::ops::Range;

use crate::position::line_at;

/// The exact defining region of a named definition.
///
/// A span covers any decorators or attributes directly preceding the
/// signature, the signature itself, documentation attached to the
/// definition, and the full body. It never carries a trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    name: String,
    byte_range: Range<usize>,
    start_line: u32,
    end_line: u32,
    text: String,
}

impl Span {
    /// Cuts the span `range` for `name` out of `source`.
    ///
    /// Returns `None` when the range does not fall on character boundaries
    /// inside `source`.
    #[must_use]
    pub fn from_source(source: &str, name: impl Into<String>, range: Range<usize>) -> Option<Self> {
        let text = source.get(range.clone())?.to_owned();
        Some(Self {
            name: name.into(),
            start_line: line_at(source, range.start),
            end_line: line_at(source, range.end.saturating_sub(1).max(range.start)),
            byte_range: range,
            text,
        })
    }

    /// The (possibly qualified) name of the definition.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte range of the span within the source it was cut from.
    #[must_use]
    pub fn byte_range(&self) -> Range<usize> {
        self.byte_range.clone()
    }

    /// One-based line on which the span starts.
    #[must_use]
    pub const fn start_line(&self) -> u32 {
        self.start_line
    }

    /// One-based line on which the span ends.
    #[must_use]
    pub const fn end_line(&self) -> u32 {
        self.end_line
    }

    /// The captured text, verbatim.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the span and returns its text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}
