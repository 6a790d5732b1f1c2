//! Error types for the s3tests core.

/// Errors raised while loading or interpreting the suite configuration.
#[derive(Debug, thiserror::Error)]
pub enum S3TestsError {
    /// A required INI section is absent.
    #[error("missing config section [{0}]")]
    MissingSection(String),

    /// A key holds a value that cannot be interpreted.
    #[error("invalid value for [{section}] {key}: {value:?}")]
    InvalidValue {
        /// Section name as written in the file.
        section: String,
        /// Key name as written in the file.
        key: String,
        /// The offending raw value.
        value: String,
    },

    /// The INI source could not be read or parsed.
    #[error("failed to read config: {0}")]
    Source(#[from] config::ConfigError),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for configuration operations.
pub type S3TestsResult<T> = Result<T, S3TestsError>;
