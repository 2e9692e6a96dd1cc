//! Harness error types.

use std::path::PathBuf;

use billing_webhook_auth::SignatureError;

/// Errors reported to the operator by the harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Canonicalization or signing failed.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// No secret was given and none could be read from the prompt.
    #[error("no webhook secret provided")]
    MissingSecret,

    /// Console I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The payload file could not be read.
    #[error("failed to read payload file {path}: {message}")]
    PayloadFile {
        /// Path of the payload file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("endpoint rejected webhook with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}
