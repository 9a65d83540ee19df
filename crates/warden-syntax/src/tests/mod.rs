//! Test suites for warden-syntax.
