/*!
 * Error types for the vocadeck application.
 *
 * This module contains custom error types for the different layers of the
 * enrichment pipeline, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when querying an external data source
///
/// These never leave the attribute resolver: every variant is downgraded
/// to "no value" and recorded as a failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Error when sending the request fails
    #[error("Request failed: {0}")]
    Request(String),

    /// The source answered with a non-success status
    #[error("Source responded with status {status_code}")]
    Status {
        /// HTTP status code
        status_code: u16,
    },

    /// Error when parsing a source response fails
    #[error("Failed to parse source response: {0}")]
    Parse(String),

    /// The source did not answer within its timeout
    #[error("Timed out after {0} ms")]
    Timeout(u64),

    /// The source cannot serve the requested language pair or input
    #[error("Unsupported request: {0}")]
    Unsupported(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(0)
        } else if let Some(status) = error.status() {
            Self::Status { status_code: status.as_u16() }
        } else if error.is_decode() {
            Self::Parse(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}

/// Errors raised while persisting the word or card store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error from a file operation
    #[error("Store I/O error at {path}: {message}")]
    Io {
        /// Path of the store file
        path: String,
        /// Underlying error message
        message: String,
    },

    /// Error serializing the store to JSON
    #[error("Failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised by a package assembler
#[derive(Error, Debug)]
pub enum PackageError {
    /// Error writing the package or copying media
    #[error("Package I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error writing the package file
    #[error("Failed to write package: {0}")]
    Write(String),

    /// Nothing to package
    #[error("Build set is empty, nothing to package")]
    Empty,
}

/// Errors that end a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The user interrupted the run
    #[error("Run cancelled during {stage}")]
    Cancelled {
        /// Name of the stage that observed the cancellation
        stage: String,
    },

    /// Error from store persistence
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error from package assembly
    #[error("Package error: {0}")]
    Package(#[from] PackageError),
}

impl PipelineError {
    /// Whether the run ended because of a user interrupt
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
