//! CLI argument definitions for the Warden toolchain.

use clap::{Parser, Subcommand};
use warden_config::Config;

/// Command-line interface for the Warden code protection tool.
#[derive(Parser, Debug)]
#[command(
    name = "warden",
    version,
    about = "Protect code regions from unreviewed modification",
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    /// Shared runtime configuration.
    #[command(flatten)]
    pub(crate) config: Config,
    /// The operation to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Warden subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Protects files or identifiers.
    Add {
        /// `path`, `path:identifier` or a glob such as `"src/*.py:test_*"`.
        /// Quote patterns to stop the shell expanding them.
        #[arg(value_name = "TARGET", required = true)]
        targets: Vec<String>,
    },
    /// Re-fingerprints protected targets after an intended change.
    Update {
        /// Protected targets to refresh; patterns match existing records.
        #[arg(value_name = "TARGET", required = true)]
        targets: Vec<String>,
    },
    /// Removes protection from targets.
    Remove {
        /// Protected targets to drop; patterns match existing records.
        #[arg(value_name = "TARGET", required = true)]
        targets: Vec<String>,
    },
    /// Lists protected targets, the registry itself first.
    List,
    /// Verifies every protected target and fails on drift.
    Verify,
    /// Installs a git pre-commit hook that runs `warden verify`.
    InstallHook,
}
