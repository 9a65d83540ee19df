//! Human-readable rendering of command results.
//!
//! Successes go to stdout; failures, warnings and violations go to stderr so
//! that hook scripts can surface them directly.

use std::io::{self, Write};

use warden_core::{BatchOutcome, ProtectionRecord, VerifyReport};

use crate::hook::HookOutcome;

fn record_line(record: &ProtectionRecord) -> String {
    format!("{} ({})", record.key(), record.fingerprint())
}

fn problems<E: Write>(outcome: &BatchOutcome, stderr: &mut E) -> io::Result<()> {
    for failure in outcome.failures() {
        writeln!(stderr, "Error: {}", failure.error())?;
    }
    for target in outcome.unmatched() {
        writeln!(stderr, "Warning: '{target}' matched nothing")?;
    }
    Ok(())
}

/// Reports the records written by `add` or `update`, prefixed with `verb`.
pub(crate) fn written<W: Write, E: Write>(
    verb: &str,
    outcome: &BatchOutcome,
    stdout: &mut W,
    stderr: &mut E,
) -> io::Result<()> {
    for record in outcome.changed() {
        writeln!(stdout, "{verb} {}", record_line(record))?;
    }
    problems(outcome, stderr)
}

/// Reports the outcome of `remove`.
pub(crate) fn removed<W: Write, E: Write>(
    outcome: &BatchOutcome,
    stdout: &mut W,
    stderr: &mut E,
) -> io::Result<()> {
    problems(outcome, stderr)?;
    match outcome.changed().len() {
        0 => writeln!(stderr, "No matching protections found"),
        count => writeln!(stdout, "Removed {count} protection(s)"),
    }
}

/// Lists every record, or a placeholder when there are none.
pub(crate) fn listing<W: Write>(records: &[ProtectionRecord], stdout: &mut W) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(stdout, "No protected entries");
    }
    for record in records {
        writeln!(stdout, "{}", record_line(record))?;
    }
    Ok(())
}

/// Reports a verification run.
pub(crate) fn verification<W: Write, E: Write>(
    report: &VerifyReport,
    stdout: &mut W,
    stderr: &mut E,
) -> io::Result<()> {
    if report.is_clean() {
        return writeln!(stdout, "All protected code verified successfully");
    }
    writeln!(stderr, "warden violations found:")?;
    for status in report.violations() {
        let Some(violation) = status.violation() else {
            continue;
        };
        match violation.detail() {
            Some(detail) => writeln!(stderr, "  {} - {} ({detail})", status.key(), violation.kind())?,
            None => writeln!(stderr, "  {} - {}", status.key(), violation.kind())?,
        }
    }
    Ok(())
}

/// Reports what hook installation did.
pub(crate) fn hook<W: Write>(outcome: &HookOutcome, stdout: &mut W) -> io::Result<()> {
    match outcome {
        HookOutcome::AlreadyInstalled(_) => writeln!(stdout, "warden hook already installed"),
        HookOutcome::Appended(path) => {
            writeln!(stdout, "Appending warden to existing pre-commit hook")?;
            writeln!(stdout, "Hook installed at {path}")
        }
        HookOutcome::Installed(path) => {
            writeln!(stdout, "Installing pre-commit hook")?;
            writeln!(stdout, "Hook installed at {path}")
        }
    }
}
