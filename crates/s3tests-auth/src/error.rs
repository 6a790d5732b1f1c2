//! Error types for request signing.

/// Errors that can occur while producing a signature.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A chunked upload was requested with a zero chunk size.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    /// A POST policy document could not be serialized.
    #[error("failed to serialize policy document: {0}")]
    Policy(#[from] serde_json::Error),
}
