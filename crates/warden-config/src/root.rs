//! Repository root discovery.

use std::env;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::defaults::REPOSITORY_MARKER;
use crate::error::ConfigError;

/// Resolves the repository root.
///
/// An explicit root wins and must be an existing directory; a relative
/// explicit root is taken relative to `cwd`. Otherwise the nearest ancestor
/// of `cwd` (itself included) holding a `.git` entry is used, falling back
/// to `cwd`.
///
/// # Errors
///
/// Returns [`ConfigError::RootNotDirectory`] when the explicit root is not
/// a directory.
pub fn discover_root(explicit: Option<&Utf8Path>, cwd: &Utf8Path) -> Result<Utf8PathBuf, ConfigError> {
    if let Some(root) = explicit {
        let candidate = cwd.join(root);
        if !candidate.is_dir() {
            return Err(ConfigError::RootNotDirectory { path: candidate });
        }
        debug!(root = %candidate, "using explicit repository root");
        return Ok(candidate);
    }

    let discovered = cwd
        .ancestors()
        .find(|dir| dir.join(REPOSITORY_MARKER).exists())
        .unwrap_or(cwd)
        .to_owned();
    debug!(root = %discovered, "discovered repository root");
    Ok(discovered)
}

/// Returns the process working directory as a UTF-8 path.
///
/// # Errors
///
/// Returns [`ConfigError::CurrentDir`] when the directory cannot be read and
/// [`ConfigError::NonUtf8Path`] when it is not valid UTF-8.
pub fn current_dir() -> Result<Utf8PathBuf, ConfigError> {
    let cwd = env::current_dir().map_err(ConfigError::CurrentDir)?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|path| ConfigError::NonUtf8Path { path })
}
