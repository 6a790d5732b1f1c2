//! Error type shared by every fixture operation.
//!
//! Server-side failures are the thing under test, so they are kept
//! structured: a test can assert on [`FixtureError::status`] and
//! [`FixtureError::code`] instead of matching on SDK-specific error enums.

use std::fmt::Debug;

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;

use crate::checksums::ChecksumError;

/// Errors produced by fixture helpers.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// The server answered with an error status.
    #[error("{operation} failed with {status} {code}: {message}")]
    Service {
        /// Operation name, e.g. `PutObject`.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// S3 error code, empty for body-less responses such as `HEAD`.
        code: String,
        /// Error message reported by the server.
        message: String,
    },

    /// The request never produced a response (connect, timeout, construction).
    #[error("{operation} failed without a response: {message}")]
    Transport {
        /// Operation name.
        operation: &'static str,
        /// Rendered error chain.
        message: String,
    },

    /// A response did not match what the test expected.
    #[error("{what}: expected {expected}, got {actual}")]
    Mismatch {
        /// What was being compared.
        what: String,
        /// Expected value, debug-formatted.
        expected: String,
        /// Actual value, debug-formatted.
        actual: String,
    },

    /// A request that should have been rejected succeeded.
    #[error("{operation} succeeded but was expected to fail")]
    UnexpectedSuccess {
        /// Operation name.
        operation: &'static str,
    },

    /// A response lacked a field the helper depends on.
    #[error("response is missing {0}")]
    MissingField(&'static str),

    /// An SDK input could not be built.
    #[error("failed to build request input: {0}")]
    Build(#[from] aws_sdk_s3::error::BuildError),

    /// A response body stream failed.
    #[error("failed to read response body: {0}")]
    Body(#[from] aws_sdk_s3::primitives::ByteStreamError),

    /// A body expected to be text was not UTF-8.
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Raw HTTP request failure.
    #[error("raw HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML error document could not be parsed.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// Invalid presigning parameters.
    #[error("invalid presigning config: {0}")]
    Presign(#[from] aws_sdk_s3::presigning::PresigningConfigError),

    /// Request signing failure.
    #[error(transparent)]
    Auth(#[from] s3tests_auth::AuthError),

    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] s3tests_core::S3TestsError),

    /// Checksum decoding or combination failure.
    #[error(transparent)]
    Checksum(#[from] ChecksumError),

    /// A spawned request task panicked or was cancelled.
    #[error("spawned task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result alias for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;

impl FixtureError {
    /// Build a [`FixtureError::Mismatch`] from debug-formatted values.
    pub fn mismatch(what: impl Into<String>, expected: impl Debug, actual: impl Debug) -> Self {
        Self::Mismatch {
            what: what.into(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }

    /// HTTP status of a service error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// S3 error code of a service error.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    fn from_sdk<E>(operation: &'static str, err: &SdkError<E, HttpResponse>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
    {
        match err.raw_response() {
            Some(response) => Self::Service {
                operation,
                status: response.status().as_u16(),
                code: err.code().unwrap_or_default().to_owned(),
                message: err.message().unwrap_or_default().to_owned(),
            },
            None => Self::Transport {
                operation,
                message: DisplayErrorContext(err).to_string(),
            },
        }
    }
}

/// Compare two values, producing a [`FixtureError::Mismatch`] on inequality.
pub fn ensure_eq<T>(what: &str, expected: T, actual: T) -> FixtureResult<()>
where
    T: PartialEq + Debug,
{
    if expected == actual {
        Ok(())
    } else {
        Err(FixtureError::mismatch(what, expected, actual))
    }
}

/// Require that `result` failed with `status` and, when given, `code`.
pub fn ensure_error<T>(
    operation: &'static str,
    result: FixtureResult<T>,
    status: u16,
    code: Option<&str>,
) -> FixtureResult<FixtureError> {
    let err = match result {
        Ok(_) => return Err(FixtureError::UnexpectedSuccess { operation }),
        Err(err) => err,
    };
    ensure_eq(&format!("{operation} status"), Some(status), err.status())?;
    if let Some(code) = code {
        ensure_eq(&format!("{operation} error code"), Some(code), err.code())?;
    }
    Ok(err)
}

/// Converts SDK results into [`FixtureResult`], tagging them with an operation name.
pub trait SdkResultExt<T> {
    /// Map an `SdkError` into [`FixtureError::Service`] or [`FixtureError::Transport`].
    fn op(self, operation: &'static str) -> FixtureResult<T>;
}

impl<T, E> SdkResultExt<T> for Result<T, SdkError<E, HttpResponse>>
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    fn op(self, operation: &'static str) -> FixtureResult<T> {
        self.map_err(|err| FixtureError::from_sdk(operation, &err))
    }
}
