//! Whole-object and ranged content checks.

use aws_sdk_s3::Client;
use aws_sdk_s3::types::Object;
use bytes::Bytes;
use s3tests_core::constants::{NOT_MATCHED, sse};
use typed_builder::TypedBuilder;

use crate::data::{ByteRange, get_random_range, split_ranges};
use crate::error::{FixtureError, FixtureResult, SdkResultExt, ensure_eq};

/// Longest range drawn by [`check_content_using_random_range`].
pub const RANDOM_RANGE_MAX: usize = 500;

/// How an object is read back.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct ReadOptions {
    /// Read this version instead of the latest.
    #[builder(default, setter(into, strip_option))]
    pub version_id: Option<String>,

    /// Send the shared customer key; the client must use TLS.
    #[builder(default)]
    pub sse_c: bool,
}

impl ReadOptions {
    fn sse_algorithm(&self) -> Option<String> {
        self.sse_c.then(|| sse::ALGORITHM.to_owned())
    }

    fn sse_key(&self) -> Option<String> {
        self.sse_c.then(|| sse::KEY.to_owned())
    }

    fn sse_key_md5(&self) -> Option<String> {
        self.sse_c.then(|| sse::KEY_MD5.to_owned())
    }
}

/// An object body with the `Content-Length` the server reported.
#[derive(Debug, Clone)]
pub struct ObjectRead {
    /// Reported `Content-Length`.
    pub content_length: Option<i64>,
    /// Body bytes.
    pub body: Bytes,
}

/// Read `bucket/key`, optionally a byte range of it.
pub async fn read_object(
    client: &Client,
    bucket: &str,
    key: &str,
    range: Option<ByteRange>,
    options: &ReadOptions,
) -> FixtureResult<ObjectRead> {
    let output = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .set_range(range.map(|r| r.header()))
        .set_version_id(options.version_id.clone())
        .set_sse_customer_algorithm(options.sse_algorithm())
        .set_sse_customer_key(options.sse_key())
        .set_sse_customer_key_md5(options.sse_key_md5())
        .send()
        .await
        .op("GetObject")?;
    let content_length = output.content_length();
    let body = output.body.collect().await?.into_bytes();
    Ok(ObjectRead {
        content_length,
        body,
    })
}

/// `Content-Length` reported by `HeadObject`.
pub async fn object_size(
    client: &Client,
    bucket: &str,
    key: &str,
    options: &ReadOptions,
) -> FixtureResult<usize> {
    let output = client
        .head_object()
        .bucket(bucket)
        .key(key)
        .set_version_id(options.version_id.clone())
        .set_sse_customer_algorithm(options.sse_algorithm())
        .set_sse_customer_key(options.sse_key())
        .set_sse_customer_key_md5(options.sse_key_md5())
        .send()
        .await
        .op("HeadObject")?;
    let length = output
        .content_length()
        .ok_or(FixtureError::MissingField("Content-Length"))?;
    usize::try_from(length).map_err(|_| FixtureError::mismatch("Content-Length", "non-negative", length))
}

/// Read the object `loops` times; every read must equal `expected`.
pub async fn check_content(
    client: &Client,
    bucket: &str,
    key: &str,
    expected: &str,
    loops: usize,
) -> FixtureResult<()> {
    check_content_with(client, bucket, key, expected, loops, &ReadOptions::default()).await
}

/// [`check_content`] with explicit read options.
pub async fn check_content_with(
    client: &Client,
    bucket: &str,
    key: &str,
    expected: &str,
    loops: usize,
    options: &ReadOptions,
) -> FixtureResult<()> {
    for _ in 0..loops {
        let read = read_object(client, bucket, key, None, options).await?;
        ensure_same_bytes(&format!("{bucket}/{key}"), expected.as_bytes(), &read.body)?;
    }
    Ok(())
}

/// Walk the object in `step`-byte ranges, checking every length and slice.
pub async fn check_content_using_range(
    client: &Client,
    bucket: &str,
    key: &str,
    expected: &str,
    step: usize,
    options: &ReadOptions,
) -> FixtureResult<()> {
    let size = object_size(client, bucket, key, options).await?;
    ensure_eq(&format!("{bucket}/{key} size"), expected.len(), size)?;

    for range in split_ranges(size, step) {
        let read = read_object(client, bucket, key, Some(range), options).await?;
        ensure_eq(
            &format!("{bucket}/{key} {} length", range.header()),
            Some(range.len() as i64),
            read.content_length,
        )?;
        ensure_same_bytes(
            &format!("{bucket}/{key} {}", range.header()),
            range.slice(expected.as_bytes()),
            &read.body,
        )?;
    }
    Ok(())
}

/// Read `loops` random ranges of at most [`RANDOM_RANGE_MAX`] bytes.
pub async fn check_content_using_random_range(
    client: &Client,
    bucket: &str,
    key: &str,
    expected: &str,
    loops: usize,
    options: &ReadOptions,
) -> FixtureResult<()> {
    if expected.is_empty() {
        return Ok(());
    }
    for _ in 0..loops {
        let range = get_random_range(expected.len(), RANDOM_RANGE_MAX);
        let read = read_object(client, bucket, key, Some(range), options).await?;
        ensure_eq(
            &format!("{bucket}/{key} {} length", range.header()),
            Some(range.len() as i64),
            read.content_length,
        )?;
        ensure_same_bytes(
            &format!("{bucket}/{key} {}", range.header()),
            range.slice(expected.as_bytes()),
            &read.body,
        )?;
    }
    Ok(())
}

/// Source (optionally a given version) and target must have the same size and body.
pub async fn check_copy_content(
    client: &Client,
    source_bucket: &str,
    source_key: &str,
    target_bucket: &str,
    target_key: &str,
    source: &ReadOptions,
    target: &ReadOptions,
) -> FixtureResult<()> {
    let source_read = read_object(client, source_bucket, source_key, None, source).await?;
    let target_read = read_object(client, target_bucket, target_key, None, target).await?;
    ensure_eq(
        "copy size",
        source_read.content_length,
        target_read.content_length,
    )?;
    ensure_same_bytes("copy body", &source_read.body, &target_read.body)
}

/// The target must equal the leading bytes of the source.
pub async fn check_copy_content_prefix(
    client: &Client,
    source_bucket: &str,
    source_key: &str,
    target_bucket: &str,
    target_key: &str,
) -> FixtureResult<()> {
    let options = ReadOptions::default();
    let target_read = read_object(client, target_bucket, target_key, None, &options).await?;
    if target_read.body.is_empty() {
        return Ok(());
    }
    let range = ByteRange {
        start: 0,
        end: target_read.body.len() - 1,
    };
    let source_read = read_object(client, source_bucket, source_key, Some(range), &options).await?;
    ensure_eq(
        "copy size",
        source_read.content_length,
        target_read.content_length,
    )?;
    ensure_same_bytes("copy body", &source_read.body, &target_read.body)
}

/// Compare source and target range by range.
pub async fn check_copy_content_using_range(
    client: &Client,
    source_bucket: &str,
    source_key: &str,
    target_bucket: &str,
    target_key: &str,
    step: usize,
) -> FixtureResult<()> {
    let options = ReadOptions::default();
    let size = object_size(client, source_bucket, source_key, &options).await?;
    for range in split_ranges(size, step) {
        let source_read =
            read_object(client, source_bucket, source_key, Some(range), &options).await?;
        let target_read =
            read_object(client, target_bucket, target_key, Some(range), &options).await?;
        ensure_eq(
            &format!("{} length", range.header()),
            source_read.content_length,
            target_read.content_length,
        )?;
        ensure_same_bytes(&range.header(), &source_read.body, &target_read.body)?;
    }
    Ok(())
}

/// Sum of the listed object sizes.
#[must_use]
pub fn get_bytes_used(objects: &[Object]) -> i64 {
    objects.iter().filter_map(Object::size).sum()
}

fn ensure_same_bytes(what: &str, expected: &[u8], actual: &[u8]) -> FixtureResult<()> {
    if expected == actual {
        return Ok(());
    }
    let first_difference = expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .unwrap_or_else(|| expected.len().min(actual.len()));
    Err(FixtureError::Mismatch {
        what: format!("{what}: {NOT_MATCHED}"),
        expected: format!("{} bytes", expected.len()),
        actual: format!(
            "{} bytes, first difference at offset {first_difference}",
            actual.len()
        ),
    })
}
