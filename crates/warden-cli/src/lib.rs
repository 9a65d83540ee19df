//! Command-line runtime for the Warden code protection tool.
//!
//! The runtime parses arguments, installs telemetry, resolves the repository
//! root and dispatches one command to `warden-core`. It writes through the
//! streams it is given so tests can capture output without spawning the
//! binary.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use warden_core::{BatchOutcome, Guard, Verifier};
use warden_syntax::ExtractorRegistry;

mod cli;
mod errors;
mod hook;
mod output;
mod telemetry;

use cli::{Cli, CliCommand};
use errors::AppError;

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, stdout, stderr),
    };
    match execute(cli, stdout, stderr) {
        Ok(exit_code) => exit_code,
        Err(error) => {
            drop(writeln!(stderr, "Error: {error}"));
            ExitCode::FAILURE
        }
    }
}

fn report_usage<W: Write, E: Write>(error: &clap::Error, stdout: &mut W, stderr: &mut E) -> ExitCode {
    let rendered = error.render().to_string();
    let written = if error.use_stderr() {
        write!(stderr, "{rendered}")
    } else {
        write!(stdout, "{rendered}")
    };
    if written.is_err() {
        return ExitCode::FAILURE;
    }
    u8::try_from(error.exit_code()).map_or(ExitCode::FAILURE, ExitCode::from)
}

fn execute<W: Write, E: Write>(cli: Cli, stdout: &mut W, stderr: &mut E) -> Result<ExitCode, AppError> {
    telemetry::initialise(&cli.config)?;
    let cwd = warden_config::current_dir()?;
    let root = cli.config.resolve_root(&cwd)?;
    let extractors = ExtractorRegistry::with_defaults();

    match cli.command {
        CliCommand::Add { targets } => {
            let outcome = open(root, &extractors)?.add(&targets)?;
            output::written("Protected", &outcome, stdout, stderr)?;
            Ok(batch_exit(&outcome))
        }
        CliCommand::Update { targets } => {
            let outcome = open(root, &extractors)?.update(&targets)?;
            output::written("Updated", &outcome, stdout, stderr)?;
            Ok(batch_exit(&outcome))
        }
        CliCommand::Remove { targets } => {
            let outcome = open(root, &extractors)?.remove(&targets)?;
            output::removed(&outcome, stdout, stderr)?;
            Ok(exit_when(outcome.any_changed()))
        }
        CliCommand::List => {
            output::listing(&open(root, &extractors)?.list(), stdout)?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Verify => {
            let report = Verifier::new(&root, &extractors).verify_root()?;
            output::verification(&report, stdout, stderr)?;
            Ok(exit_when(report.is_clean()))
        }
        CliCommand::InstallHook => {
            output::hook(&hook::install(&root)?, stdout)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open(root: Utf8PathBuf, extractors: &ExtractorRegistry) -> Result<Guard<'_>, AppError> {
    Ok(Guard::open(root, extractors)?)
}

/// A batch fails only when nothing succeeded and something went wrong.
fn batch_exit(outcome: &BatchOutcome) -> ExitCode {
    exit_when(outcome.any_changed() || outcome.failures().is_empty())
}

const fn exit_when(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
