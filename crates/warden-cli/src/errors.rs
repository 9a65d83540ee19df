//! Error types for the CLI runtime.

use std::io;

use thiserror::Error;
use warden_config::ConfigError;
use warden_core::GuardError;

use crate::hook::HookError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to resolve configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Guard(#[from] GuardError),
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
