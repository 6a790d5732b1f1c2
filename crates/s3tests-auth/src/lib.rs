//! Client-side AWS request signing for s3tests.
//!
//! The SDK signs ordinary calls on its own. This crate covers the requests the
//! suite has to hand-build: POST form uploads, query-string presigned URLs,
//! header-signed raw PUTs and `aws-chunked` streaming uploads.
//!
//! # Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use s3tests_auth::{SignableRequest, SigningCredentials, SigningParams, sign_request};
//!
//! let credentials = SigningCredentials::new("AKIDEXAMPLE", "secret");
//! let time = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
//! let params = SigningParams::new(&credentials, "us-east-1", time);
//! let request = SignableRequest::new("GET", "/bucket/key", "")
//!     .header("host", "localhost:8080");
//! let signed = sign_request(&request, &params);
//! assert!(signed.authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240102/"));
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical request construction
//! - [`chunked`] - `STREAMING-AWS4-HMAC-SHA256-PAYLOAD` body framing
//! - [`credentials`] - Key pair used for signing
//! - [`error`] - Signing error types
//! - [`post_policy`] - Browser POST policy documents
//! - [`presign`] - Query-string presigning (V2 and V4)
//! - [`sigv2`] - Legacy HMAC-SHA1 signatures
//! - [`sigv4`] - Header-based SigV4 signing

pub mod canonical;
pub mod chunked;
pub mod credentials;
pub mod error;
pub mod post_policy;
pub mod presign;
pub mod sigv2;
pub mod sigv4;

pub use chunked::{ChunkSigner, DEFAULT_CHUNK_SIZE, calculate_chunked_content_length};
pub use credentials::SigningCredentials;
pub use error::AuthError;
pub use post_policy::PostPolicy;
pub use presign::{presign_v2, presign_v4};
pub use sigv2::sign_v2;
pub use sigv4::{SignableRequest, SignedRequest, SigningParams, hash_payload, sign_request};
