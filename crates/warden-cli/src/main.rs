//! CLI entrypoint for the Warden code protection tool.
//!
//! The binary delegates to [`warden_cli::run`], which parses arguments,
//! installs telemetry, and executes one command against the repository.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    warden_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
