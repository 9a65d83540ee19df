//! Default values and environment variable names.

use crate::logging::LogFormat;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Directory whose presence marks a repository root during discovery.
pub const REPOSITORY_MARKER: &str = ".git";

/// Environment variable overriding the repository root.
pub const ROOT_ENV: &str = "WARDEN_ROOT";

/// Environment variable overriding the log filter.
pub const LOG_FILTER_ENV: &str = "WARDEN_LOG_FILTER";

/// Environment variable overriding the log format.
pub const LOG_FORMAT_ENV: &str = "WARDEN_LOG_FORMAT";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
