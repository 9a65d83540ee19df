//! Content fingerprints.
//!
//! A fingerprint is the SHA-256 digest of the exact bytes it covers,
//! rendered as 64 lowercase hex characters. Nothing is normalised first:
//! any byte-level edit, whitespace and line endings included, changes it.

use std::fmt;

use sha2::{Digest, Sha256};

/// Length of a rendered fingerprint.
pub const FINGERPRINT_LEN: usize = 64;

/// Hex-encoded SHA-256 digest of a protected region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of `content`.
    #[must_use]
    pub fn of(content: impl AsRef<[u8]>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_ref());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Parses a stored fingerprint, accepting either hex case.
    ///
    /// Returns `None` unless `hex` is exactly 64 hex digits.
    #[must_use]
    pub fn parse(hex: &str) -> Option<Self> {
        let valid = hex.len() == FINGERPRINT_LEN && hex.bytes().all(|byte| byte.is_ascii_hexdigit());
        valid.then(|| Self(hex.to_ascii_lowercase()))
    }

    /// The full hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The leading characters of the digest, for display.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..16).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn digest_is_lowercase_sha256_hex() {
        assert_eq!(
            Fingerprint::of("").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn identical_content_yields_identical_fingerprints() {
        assert_eq!(Fingerprint::of("def calc():\n    return 1"), Fingerprint::of("def calc():\n    return 1"));
    }

    #[rstest]
    #[case("def calc():\n    return 1", "def calc():\n    return 2")]
    #[case("def calc():\n    return 1", "def calc():\n    return 1 ")]
    #[case("a\nb", "a\r\nb")]
    #[case("# note\nx = 1", "# Note\nx = 1")]
    fn any_byte_change_alters_the_fingerprint(#[case] before: &str, #[case] after: &str) {
        assert_ne!(Fingerprint::of(before), Fingerprint::of(after));
    }

    #[rstest]
    #[case("E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855", true)]
    #[case("e3b0c442", false)]
    #[case("z3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855", false)]
    fn parse_validates_length_and_digits(#[case] input: &str, #[case] valid: bool) {
        let parsed = Fingerprint::parse(input);
        assert_eq!(parsed.is_some(), valid);
        if let Some(fingerprint) = parsed {
            assert_eq!(fingerprint, Fingerprint::of(""));
        }
    }

    #[test]
    fn short_form_is_a_prefix() {
        let fingerprint = Fingerprint::of("x");
        assert_eq!(fingerprint.short().len(), 16);
        assert!(fingerprint.as_str().starts_with(fingerprint.short()));
    }
}
