//! Error types for webhook signing.

/// Result type for canonicalization and signing operations.
pub type Result<T> = std::result::Result<T, SignatureError>;

/// Errors that can occur while canonicalizing or signing a payload.
///
/// Verification never surfaces these; see [`crate::Rejection`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The payload contains a value that has no JSON representation.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The webhook secret is empty or missing.
    #[error("invalid secret: webhook secret must not be empty")]
    InvalidSecret,

    /// The secret or payload bytes are not valid UTF-8.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl From<serde_json::Error> for SignatureError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
