//! Configuration, user data and shared constants for the s3tests suite.
//!
//! Everything the fixture layer needs to know about the target endpoint lives
//! here: the INI-backed [`S3Config`], the [`UserData`] credential sets used for
//! cross-account scenarios, and the error codes and header values the suite
//! asserts against.

pub mod constants;

mod config;
mod error;
mod types;

pub use config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, DEFAULT_REGION, S3Config};
pub use error::{S3TestsError, S3TestsResult};
pub use types::{SignatureVersion, UserData};
