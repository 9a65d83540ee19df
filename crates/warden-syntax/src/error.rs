//! Error types for span extraction.
//!
//! Extractors work on source text alone, so these errors carry names and
//! languages but never file paths. Callers that know the path attach it
//! when they surface the error.

use thiserror::Error;

/// Errors raised while locating or enumerating definitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExtractError {
    /// No extractor is registered for the file extension.
    #[error("unsupported language: no extractor registered for '{extension}'")]
    UnsupportedLanguage {
        /// The extension (without the leading dot) that was not recognised.
        extension: String,
    },

    /// Failed to initialise the Tree-sitter parser for a language.
    #[error("failed to initialise {language} parser: {message}")]
    ParserInit {
        /// The language whose grammar could not be loaded.
        language: String,
        /// Description of the failure.
        message: String,
    },

    /// The source could not be understood well enough to find the name.
    #[error("failed to parse {language} source: {message}")]
    Parse {
        /// The language of the source.
        language: String,
        /// Description of the failure, including the first error location.
        message: String,
    },

    /// No definition with the requested name exists.
    #[error("identifier '{name}' not found")]
    NotFound {
        /// The requested name.
        name: String,
    },

    /// More than one definition in the same scope carries the name.
    #[error("identifier '{name}' is defined {count} times in the same scope")]
    Ambiguous {
        /// The requested name.
        name: String,
        /// Number of definitions found.
        count: usize,
    },
}

impl ExtractError {
    /// Creates an unsupported language error.
    #[must_use]
    pub fn unsupported_language(extension: impl Into<String>) -> Self {
        Self::UnsupportedLanguage {
            extension: extension.into(),
        }
    }

    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParserInit {
            language: language.into(),
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates an ambiguous-name error.
    #[must_use]
    pub fn ambiguous(name: impl Into<String>, count: usize) -> Self {
        Self::Ambiguous {
            name: name.into(),
            count,
        }
    }
}
