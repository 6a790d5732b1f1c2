//! Fixture layer for the s3tests conformance suite.
//!
//! Every integration test starts from a [`TestContext`]: it hands out SDK
//! clients for the configured users, creates uniquely named buckets and
//! removes them again in [`TestContext::teardown`]. The remaining modules are
//! building blocks for the scenarios themselves.
//!
//! # Modules
//!
//! - [`acl`] - Owners, grants and canned-ACL setups
//! - [`assertions`] - Allowed/denied access checks
//! - [`backend`] - Vendor replication operations with replayed metadata
//! - [`bucket`] - Bucket and object creation, name validation
//! - [`checksums`] - CRC/SHA checksums and multipart combination
//! - [`client`] - SDK client construction
//! - [`compare`] - Order-insensitive comparison of ACLs, tags and configurations
//! - [`content`] - Whole-object and ranged content checks
//! - [`context`] - Per-test state and teardown
//! - [`data`] - Random payloads and byte ranges
//! - [`error`] - [`FixtureError`] and SDK error conversion
//! - [`http`] - Raw HTTP: POST uploads, CORS, presigned URLs, signed PUTs
//! - [`lifecycle`] - Lifecycle rule setup
//! - [`listing`] - Paged listing validation
//! - [`multipart`] - Multipart uploads and copies
//! - [`policy`] - Bucket policy documents
//! - [`sse`] - Server-side encryption round trips
//! - [`tags`] - Tag sets
//! - [`time`] - Timestamps and retention dates
//! - [`versioning`] - Versioned writes, deletes and checks

pub mod acl;
pub mod assertions;
pub mod backend;
pub mod bucket;
pub mod checksums;
pub mod client;
pub mod compare;
pub mod content;
pub mod context;
pub mod data;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod listing;
pub mod multipart;
pub mod policy;
pub mod sse;
pub mod tags;
pub mod time;
pub mod versioning;

pub use checksums::{ChecksumAlgorithm, ResponseChecksums};
pub use client::{ClientCredentials, ClientFactory, ClientOptions};
pub use context::{BucketTracker, TestContext};
pub use error::{FixtureError, FixtureResult, SdkResultExt, ensure_eq, ensure_error};
pub use http::{RawHttp, RawResponse};
pub use listing::ListExpectation;
pub use multipart::{MultipartCopyOptions, MultipartOptions, MultipartUploadData};
pub use versioning::VersionLedger;
