//! Error types for the protection engine.
//!
//! Failures that concern a single target (an unknown identifier, a missing
//! file) are collected per target by the batch operations and never abort
//! the rest of the batch. Structural failures (an unreadable or malformed
//! registry, an unsupported language during verification) stop the whole
//! operation.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;
use warden_syntax::ExtractError;

/// Errors raised while parsing a target specification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TargetError {
    /// The target names no path.
    #[error("target '{target}' does not name a path")]
    EmptyPath {
        /// The offending target string.
        target: String,
    },

    /// The path climbs out of the repository with `..`.
    #[error("target '{target}' leaves the repository root")]
    OutsideRoot {
        /// The offending target string.
        target: String,
    },

    /// The path or identifier pattern is not a valid glob.
    #[error("invalid pattern in target '{target}': {message}")]
    InvalidPattern {
        /// The offending target string.
        target: String,
        /// Description of the pattern error.
        message: String,
    },

    /// The target addresses the registry file, which protects itself.
    #[error("'{target}' is the registry file; it is protected automatically")]
    RegistryFile {
        /// The offending target string.
        target: String,
    },
}

/// A line of the registry file that cannot be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed registry line {line}: {message}")]
pub struct RegistryFormatError {
    line: usize,
    message: String,
}

impl RegistryFormatError {
    /// Creates an error for the one-based `line`.
    #[must_use]
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    /// One-based line number of the malformed line.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Description of what is wrong with the line.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by the protection engine.
#[derive(Debug, Error)]
pub enum GuardError {
    /// No extractor is registered for the file's extension.
    #[error("unsupported language for '{path}': no extractor registered for '.{extension}'")]
    UnsupportedLanguage {
        /// Repository-relative path of the file.
        path: String,
        /// The unrecognised extension.
        extension: String,
    },

    /// The extractor could not make sense of the file.
    #[error("failed to parse '{path}' as {language}: {message}")]
    Parse {
        /// Repository-relative path of the file.
        path: String,
        /// Language the file was parsed as.
        language: String,
        /// Description of the failure.
        message: String,
    },

    /// The named identifier is absent from the file.
    #[error("identifier '{identifier}' not found in '{path}'")]
    NotFound {
        /// Repository-relative path of the file.
        path: String,
        /// The requested identifier.
        identifier: String,
    },

    /// The identifier is defined more than once in the same scope.
    #[error("identifier '{identifier}' is defined {count} times in '{path}'")]
    Ambiguous {
        /// Repository-relative path of the file.
        path: String,
        /// The requested identifier.
        identifier: String,
        /// Number of definitions found.
        count: usize,
    },

    /// Any other extraction failure.
    #[error("failed to extract from '{path}': {source}")]
    Extract {
        /// Repository-relative path of the file.
        path: String,
        /// The underlying extractor error.
        source: ExtractError,
    },

    /// The target path does not exist.
    #[error("file not found: '{path}'")]
    FileNotFound {
        /// Repository-relative path that was expected to exist.
        path: String,
    },

    /// Update or removal of a target that has no record.
    #[error("'{target}' is not protected")]
    NotProtected {
        /// The target, rendered as `path[:identifier]`.
        target: String,
    },

    /// The registry file is malformed.
    #[error(transparent)]
    RegistryFormat(#[from] RegistryFormatError),

    /// The target specification is invalid.
    #[error(transparent)]
    InvalidTarget(#[from] TargetError),

    /// Reading or writing a file failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        /// The file being accessed.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

impl GuardError {
    /// Attaches the repository-relative `path` to an extractor error.
    #[must_use]
    pub fn from_extract(path: impl Into<String>, error: ExtractError) -> Self {
        let file = path.into();
        match error {
            ExtractError::UnsupportedLanguage { extension } => {
                Self::UnsupportedLanguage {
                    path: file,
                    extension,
                }
            }
            ExtractError::Parse { language, message } => Self::Parse {
                path: file,
                language,
                message,
            },
            ExtractError::NotFound { name } => Self::NotFound {
                path: file,
                identifier: name,
            },
            ExtractError::Ambiguous { name, count } => Self::Ambiguous {
                path: file,
                identifier: name,
                count,
            },
            source => Self::Extract { path: file, source },
        }
    }

    /// Wraps an I/O error with the path being accessed.
    #[must_use]
    pub fn io(path: impl Into<Utf8PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a not-protected error for `target`.
    #[must_use]
    pub fn not_protected(target: impl Into<String>) -> Self {
        Self::NotProtected {
            target: target.into(),
        }
    }
}
