//! Shared configuration for the Warden binary.
//!
//! [`Config`] is a `clap` argument group flattened into the command line.
//! Every option falls back to an environment variable and then to the
//! defaults in [`defaults`], so hooks and CI jobs can configure Warden
//! without touching the invocation.

pub mod defaults;
mod error;
mod logging;
mod root;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;

pub use defaults::{DEFAULT_LOG_FILTER, default_log_filter, default_log_format};
pub use error::ConfigError;
pub use logging::{LogFormat, LogFormatParseError};
pub use root::{current_dir, discover_root};

/// Runtime configuration shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct Config {
    /// Repository root holding the `.warden` registry. Defaults to the
    /// nearest ancestor containing `.git`, or the working directory.
    #[arg(long, global = true, env = defaults::ROOT_ENV, value_name = "DIR")]
    pub root: Option<Utf8PathBuf>,

    /// Tracing filter expression, e.g. `warden_core=debug`.
    #[arg(
        long,
        global = true,
        env = defaults::LOG_FILTER_ENV,
        default_value = DEFAULT_LOG_FILTER,
        value_name = "FILTER"
    )]
    pub log_filter: String,

    /// Log output format.
    #[arg(
        long,
        global = true,
        env = defaults::LOG_FORMAT_ENV,
        default_value_t = default_log_format(),
        value_name = "FORMAT"
    )]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: None,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Resolves the repository root relative to `cwd`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RootNotDirectory`] when an explicit root is not
    /// a directory.
    pub fn resolve_root(&self, cwd: &Utf8Path) -> Result<Utf8PathBuf, ConfigError> {
        discover_root(self.root.as_deref(), cwd)
    }
}
