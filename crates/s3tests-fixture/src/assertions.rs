//! Access checks and expected-outcome assertions.
//!
//! Each check issues one request and turns the outcome into a
//! [`FixtureResult`]: `Ok(())` when the server behaved as expected, a
//! [`FixtureError::Mismatch`] or [`FixtureError::UnexpectedSuccess`] otherwise.

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketCannedAcl, ObjectCannedAcl};
use s3tests_core::constants::codes;

use crate::bucket::get_body;
use crate::error::{FixtureError, FixtureResult, SdkResultExt, ensure_eq, ensure_error};
use crate::tags::{tag, tagging};

/// Status a denied access check expects.
pub const FORBIDDEN: u16 = 403;

/// Key written and removed by the bucket `Write` check.
pub const WRITE_PROBE_KEY: &str = "foo-write";

/// Permission probed by an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Read the resource.
    Read,
    /// Read its ACL.
    ReadAcp,
    /// Write into it.
    Write,
    /// Replace its ACL.
    WriteAcp,
}

/// Require that `client` can exercise `kind` on `bucket`.
pub async fn check_bucket_access_allowed(
    client: &Client,
    bucket: &str,
    kind: AccessKind,
) -> FixtureResult<()> {
    match kind {
        AccessKind::Read => {
            client.head_bucket().bucket(bucket).send().await.op("HeadBucket")?;
        }
        AccessKind::ReadAcp => {
            client
                .get_bucket_acl()
                .bucket(bucket)
                .send()
                .await
                .op("GetBucketAcl")?;
        }
        AccessKind::Write => {
            put_text(client, bucket, WRITE_PROBE_KEY, WRITE_PROBE_KEY).await?;
            client
                .delete_object()
                .bucket(bucket)
                .key(WRITE_PROBE_KEY)
                .send()
                .await
                .op("DeleteObject")?;
        }
        AccessKind::WriteAcp => {
            put_bucket_canned_acl(client, bucket, BucketCannedAcl::PublicReadWrite).await?;
        }
    }
    Ok(())
}

/// Require that `client` is refused `kind` on `bucket` with 403.
pub async fn check_bucket_access_denied(
    client: &Client,
    bucket: &str,
    kind: AccessKind,
) -> FixtureResult<()> {
    let (operation, result) = match kind {
        AccessKind::Read => (
            "HeadBucket",
            client
                .head_bucket()
                .bucket(bucket)
                .send()
                .await
                .op("HeadBucket")
                .map(drop),
        ),
        AccessKind::ReadAcp => (
            "GetBucketAcl",
            client
                .get_bucket_acl()
                .bucket(bucket)
                .send()
                .await
                .op("GetBucketAcl")
                .map(drop),
        ),
        AccessKind::Write => (
            "PutObject",
            put_text(client, bucket, WRITE_PROBE_KEY, WRITE_PROBE_KEY).await,
        ),
        AccessKind::WriteAcp => (
            "PutBucketAcl",
            put_bucket_canned_acl(client, bucket, BucketCannedAcl::PublicRead).await,
        ),
    };
    ensure_error(operation, result, FORBIDDEN, None).map(drop)
}

/// Require that `client` can exercise `kind` on `bucket/key`.
pub async fn check_object_access_allowed(
    client: &Client,
    bucket: &str,
    key: &str,
    kind: AccessKind,
) -> FixtureResult<()> {
    match kind {
        AccessKind::Read => {
            get_body(client, bucket, key).await?;
        }
        AccessKind::ReadAcp => {
            client
                .get_object_acl()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .op("GetObjectAcl")?;
        }
        AccessKind::Write => {
            client
                .put_object_tagging()
                .bucket(bucket)
                .key(key)
                .tagging(tagging(vec![tag("foo", "bar")?])?)
                .send()
                .await
                .op("PutObjectTagging")?;
        }
        AccessKind::WriteAcp => {
            put_object_canned_acl(client, bucket, key, ObjectCannedAcl::PublicReadWrite).await?;
        }
    }
    Ok(())
}

/// Require that `client` is refused `kind` on `bucket/key` with 403.
pub async fn check_object_access_denied(
    client: &Client,
    bucket: &str,
    key: &str,
    kind: AccessKind,
) -> FixtureResult<()> {
    let (operation, result) = match kind {
        AccessKind::Read => ("GetObject", get_body(client, bucket, key).await.map(drop)),
        AccessKind::ReadAcp => (
            "GetObjectAcl",
            client
                .get_object_acl()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .op("GetObjectAcl")
                .map(drop),
        ),
        AccessKind::Write => ("PutObject", put_text(client, bucket, key, "bar").await),
        AccessKind::WriteAcp => (
            "PutObjectAcl",
            put_object_canned_acl(client, bucket, key, ObjectCannedAcl::PublicRead).await,
        ),
    };
    ensure_error(operation, result, FORBIDDEN, None).map(drop)
}

/// Read `bucket/key` and require its body to equal `content`.
pub async fn succeed_get_object(
    client: &Client,
    bucket: &str,
    key: &str,
    content: &str,
) -> FixtureResult<()> {
    let body = get_body(client, bucket, key).await?;
    ensure_eq(&format!("body of {key}"), content, body.as_str())
}

/// Require that writing `content` to `bucket/key` succeeds.
pub async fn succeed_put_object(
    client: &Client,
    bucket: &str,
    key: &str,
    content: &str,
) -> FixtureResult<()> {
    put_text(client, bucket, key, content).await
}

/// List `bucket` and require exactly `keys`, in listing order.
pub async fn succeed_list_objects(client: &Client, bucket: &str, keys: &[&str]) -> FixtureResult<()> {
    let output = client
        .list_objects()
        .bucket(bucket)
        .send()
        .await
        .op("ListObjects")?;
    let listed: Vec<&str> = output.contents().iter().filter_map(|o| o.key()).collect();
    ensure_eq("listed keys", keys, listed.as_slice())
}

/// Require `GetObject` to fail with `status` and `code`.
pub async fn failed_get_object(
    client: &Client,
    bucket: &str,
    key: &str,
    status: u16,
    code: &str,
) -> FixtureResult<FixtureError> {
    let result = get_body(client, bucket, key).await;
    ensure_error("GetObject", result, status, Some(code))
}

/// Require `PutObject` to fail with `status` and `code`.
pub async fn failed_put_object(
    client: &Client,
    bucket: &str,
    key: &str,
    status: u16,
    code: &str,
) -> FixtureResult<FixtureError> {
    let result = put_text(client, bucket, key, key).await;
    ensure_error("PutObject", result, status, Some(code))
}

/// Require `ListObjects` to fail with `status` and `code`.
pub async fn failed_list_objects(
    client: &Client,
    bucket: &str,
    status: u16,
    code: &str,
) -> FixtureResult<FixtureError> {
    let result = client
        .list_objects()
        .bucket(bucket)
        .send()
        .await
        .op("ListObjects");
    ensure_error("ListObjects", result, status, Some(code))
}

/// Require `GetObject` to be refused with 403 `AccessDenied`.
pub async fn check_get_object_denied(
    client: &Client,
    bucket: &str,
    key: &str,
) -> FixtureResult<FixtureError> {
    failed_get_object(client, bucket, key, FORBIDDEN, codes::ACCESS_DENIED).await
}

async fn put_text(client: &Client, bucket: &str, key: &str, content: &str) -> FixtureResult<()> {
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(content.as_bytes().to_vec()))
        .send()
        .await
        .op("PutObject")?;
    Ok(())
}

async fn put_bucket_canned_acl(
    client: &Client,
    bucket: &str,
    acl: BucketCannedAcl,
) -> FixtureResult<()> {
    client
        .put_bucket_acl()
        .bucket(bucket)
        .acl(acl)
        .send()
        .await
        .op("PutBucketAcl")?;
    Ok(())
}

async fn put_object_canned_acl(
    client: &Client,
    bucket: &str,
    key: &str,
    acl: ObjectCannedAcl,
) -> FixtureResult<()> {
    client
        .put_object_acl()
        .bucket(bucket)
        .key(key)
        .acl(acl)
        .send()
        .await
        .op("PutObjectAcl")?;
    Ok(())
}
