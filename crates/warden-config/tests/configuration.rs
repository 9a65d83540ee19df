//! Precedence of command-line flags, environment variables and defaults.

use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard};

use camino::Utf8PathBuf;
use clap::Parser;
use once_cell::sync::Lazy;
use rstest::rstest;

use warden_config::{Config, DEFAULT_LOG_FILTER, LogFormat, defaults};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[derive(Debug, Parser)]
struct Harness {
    #[command(flatten)]
    config: Config,
}

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvOverride {
    fn set(key: &'static str, value: &str) -> Self {
        let guard = lock();
        let previous = std::env::var_os(key);
        // Environment mutation is unsafe in edition 2024; the mutex keeps
        // these tests from racing each other.
        unsafe { std::env::set_var(key, value) };
        Self {
            key,
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
    }
}

fn lock() -> MutexGuard<'static, ()> {
    ENV_MUTEX.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn parse(args: &[&str]) -> Config {
    let argv = std::iter::once("warden").chain(args.iter().copied());
    Harness::try_parse_from(argv)
        .unwrap_or_else(|err| panic!("arguments should parse: {err}"))
        .config
}

#[test]
fn defaults_apply_without_flags() {
    let _guard = lock();
    let config = parse(&[]);
    assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    assert_eq!(config.log_format, LogFormat::Compact);
    assert!(config.root.is_none() || std::env::var_os(defaults::ROOT_ENV).is_some());
}

#[rstest]
#[case(&["--log-format", "json"], LogFormat::Json)]
#[case(&["--log-format=COMPACT"], LogFormat::Compact)]
fn flags_select_log_format(#[case] args: &[&str], #[case] expected: LogFormat) {
    let _guard = lock();
    assert_eq!(parse(args).log_format, expected);
}

#[test]
fn flags_set_root_and_filter() {
    let _guard = lock();
    let config = parse(&["--root", "/srv/repo", "--log-filter", "warden_core=debug"]);
    assert_eq!(config.root, Some(Utf8PathBuf::from("/srv/repo")));
    assert_eq!(config.log_filter, "warden_core=debug");
}

#[test]
fn environment_fills_unset_flags() {
    let _override = EnvOverride::set(defaults::LOG_FORMAT_ENV, "json");
    assert_eq!(parse(&[]).log_format, LogFormat::Json);
    assert_eq!(parse(&["--log-format", "compact"]).log_format, LogFormat::Compact);
}

#[test]
fn unknown_formats_are_rejected() {
    let _guard = lock();
    let result = Harness::try_parse_from(["warden", "--log-format", "pretty"]);
    assert!(result.is_err());
}
