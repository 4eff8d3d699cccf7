//! Pipeline error types.

use std::path::{Path, PathBuf};

use closeflow_shared::{AppError, PeriodError};
use thiserror::Error;

use crate::io::{TableError, TemplateError};

/// Errors that abort a pipeline run.
///
/// Expected business failures (unbalanced files, missing rates) are not
/// errors: steps report them through a failed `ValidationResult`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No factory registered under this name.
    #[error("Unknown step '{name}'; registered steps: {registered}")]
    UnknownStep {
        /// Requested name.
        name: String,
        /// Comma-separated registered names.
        registered: String,
    },

    /// A required parameter, folder or naming key is missing or malformed.
    #[error("{step}: {message}")]
    InvalidParams {
        /// Step being configured.
        step: String,
        /// What is wrong.
        message: String,
    },

    /// A path template could not be expanded.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A tabular file could not be read or written.
    #[error(transparent)]
    Table(#[from] TableError),

    /// Filesystem failure outside the tabular codecs.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    /// The configured period is malformed.
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] AppError),

    /// JSON encoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Wraps an I/O error with the path involved.
    #[must_use]
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates an invalid-parameter error.
    #[must_use]
    pub fn invalid_params(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Returns the error code used in run summaries.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownStep { .. } => "UNKNOWN_STEP",
            Self::InvalidParams { .. } => "INVALID_PARAMS",
            Self::Template(_) => "TEMPLATE_ERROR",
            Self::Table(_) => "TABLE_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::Period(_) => "INVALID_PERIOD",
            Self::Config(e) => e.error_code(),
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownStep { .. }
            | Self::InvalidParams { .. }
            | Self::Template(_)
            | Self::Period(_) => 2,
            Self::Table(_) | Self::Io { .. } => 3,
            Self::Config(e) => e.exit_code(),
            Self::Serialization(_) => 70,
        }
    }
}

/// Result type alias using `PipelineError`.
pub type PipelineResult<T> = Result<T, PipelineError>;
