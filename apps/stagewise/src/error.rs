//! # CLI Errors

use crate::telemetry::TelemetryError;
use stagewise_core::{ScoringError, SessionError, StoreError};
use std::path::PathBuf;
use thiserror::Error;

/// Everything a command can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file is not valid for its format.
    #[error("invalid input in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// Writing output failed.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// Rendering JSON output failed.
    #[error("output error: {0}")]
    Render(#[from] serde_json::Error),
}
