//! Protection records and their line format.

use std::fmt;

use crate::error::RegistryFormatError;
use crate::fingerprint::Fingerprint;

/// What a record protects: a whole file, or one identifier inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey {
    path: String,
    identifier: Option<String>,
}

impl TargetKey {
    /// Key for whole-file protection of `path`.
    #[must_use]
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            identifier: None,
        }
    }

    /// Key for the identifier `name` inside `path`.
    #[must_use]
    pub fn identifier(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            identifier: Some(name.into()),
        }
    }

    /// Builds a key from a path and an optional identifier.
    #[must_use]
    pub const fn new(path: String, identifier: Option<String>) -> Self {
        Self { path, identifier }
    }

    /// Repository-relative path with `/` separators.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The protected identifier, if this is not a whole-file key.
    #[must_use]
    pub fn identifier_name(&self) -> Option<&str> {
        self.identifier.as_deref()
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identifier {
            Some(name) => write!(f, "{}:{name}", self.path),
            None => f.write_str(&self.path),
        }
    }
}

/// A persisted protection: the target and the fingerprint it had when it
/// was last added or updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionRecord {
    key: TargetKey,
    fingerprint: Fingerprint,
}

impl ProtectionRecord {
    /// Creates a record.
    #[must_use]
    pub const fn new(key: TargetKey, fingerprint: Fingerprint) -> Self {
        Self { key, fingerprint }
    }

    /// The protected target.
    #[must_use]
    pub const fn key(&self) -> &TargetKey {
        &self.key
    }

    /// Repository-relative path of the protected file.
    #[must_use]
    pub fn path(&self) -> &str {
        self.key.path()
    }

    /// The protected identifier, if any.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.key.identifier_name()
    }

    /// The stored fingerprint.
    #[must_use]
    pub const fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub(crate) fn set_fingerprint(&mut self, fingerprint: Fingerprint) {
        self.fingerprint = fingerprint;
    }

    /// Renders the record as one registry line, without the newline.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!("{}:{}", self.key, self.fingerprint)
    }

    /// Parses one registry line.
    ///
    /// The path is the text before the first `:` and the fingerprint the
    /// text after the last one; anything between is the identifier, which
    /// may itself contain `::`.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryFormatError`] for `line_number` when the line
    /// lacks a path or carries an invalid fingerprint.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Self, RegistryFormatError> {
        let (path, rest) = line.split_once(':').ok_or_else(|| {
            RegistryFormatError::new(line_number, "expected 'path:fingerprint'")
        })?;
        if path.is_empty() {
            return Err(RegistryFormatError::new(line_number, "empty path"));
        }

        let (identifier, hex) = match rest.rsplit_once(':') {
            Some((name, _)) if name.is_empty() => {
                return Err(RegistryFormatError::new(line_number, "empty identifier"));
            }
            Some((name, hex)) => (Some(name.to_owned()), hex),
            None => (None, rest),
        };

        let fingerprint = Fingerprint::parse(hex).ok_or_else(|| {
            RegistryFormatError::new(line_number, format!("invalid fingerprint '{hex}'"))
        })?;
        Ok(Self::new(
            TargetKey::new(path.to_owned(), identifier),
            fingerprint,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn hex() -> String {
        Fingerprint::of("body").to_string()
    }

    #[test]
    fn whole_file_line_has_two_fields() {
        let record = ProtectionRecord::new(TargetKey::file("src/app.py"), Fingerprint::of("body"));
        assert_eq!(record.to_line(), format!("src/app.py:{}", hex()));
    }

    #[rstest]
    #[case("src/calc.py", "calc")]
    #[case("src/shape.rs", "Shape::area")]
    #[case("src/widget.ts", "Widget.render")]
    fn identifier_lines_round_trip(#[case] path: &str, #[case] name: &str) {
        let record = ProtectionRecord::new(TargetKey::identifier(path, name), Fingerprint::of("body"));
        let parsed = ProtectionRecord::parse_line(&record.to_line(), 1).expect("parse");
        assert_eq!(parsed, record);
        assert_eq!(parsed.identifier(), Some(name));
    }

    #[rstest]
    #[case("no-separator", "expected 'path:fingerprint'")]
    #[case(":abc", "empty path")]
    #[case("a.py::0123", "empty identifier")]
    #[case("a.py:calc:xyz", "invalid fingerprint 'xyz'")]
    fn malformed_lines_name_the_problem(#[case] line: &str, #[case] message: &str) {
        let error = ProtectionRecord::parse_line(line, 7).expect_err("malformed");
        assert_eq!(error.line(), 7);
        assert_eq!(error.message(), message);
    }

    #[test]
    fn key_display_joins_path_and_identifier() {
        assert_eq!(TargetKey::identifier("a.py", "calc").to_string(), "a.py:calc");
        assert_eq!(TargetKey::file("a.py").to_string(), "a.py");
    }
}
