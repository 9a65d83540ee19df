//! Test suites for warden-core.

mod guard;
