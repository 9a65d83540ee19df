use std::io;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while settling the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The working directory could not be determined.
    #[error("failed to read the current directory: {0}")]
    CurrentDir(#[source] io::Error),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", path.display())]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },

    /// The configured repository root is not a directory.
    #[error("repository root '{path}' is not a directory")]
    RootNotDirectory {
        /// The configured root, resolved against the working directory.
        path: Utf8PathBuf,
    },
}
