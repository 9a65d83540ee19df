//! Shared position conversion helpers.
//!
//! Spans report one-based line numbers regardless of which extractor found
//! them; Tree-sitter positions are zero-based.

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
#[must_use]
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}

/// Returns the one-based line containing `offset`.
#[must_use]
pub(crate) fn line_at(source: &str, offset: usize) -> u32 {
    let newlines = source
        .as_bytes()
        .iter()
        .take(offset)
        .filter(|byte| **byte == b'\n')
        .count();
    u32::try_from(newlines.saturating_add(1)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_at_counts_preceding_newlines() {
        let source = "a\nbb\nccc";
        assert_eq!(line_at(source, 0), 1);
        assert_eq!(line_at(source, 2), 2);
        assert_eq!(line_at(source, 5), 3);
    }

    #[test]
    fn point_conversion_is_one_based() {
        let point = tree_sitter::Point { row: 0, column: 4 };
        assert_eq!(point_to_one_based(point), (1, 5));
    }
}
