//! Server-side encryption round trips (SSE-S3 and SSE-C).

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    MetadataDirective, ServerSideEncryption, ServerSideEncryptionByDefault,
    ServerSideEncryptionConfiguration, ServerSideEncryptionRule,
};
use s3tests_core::constants::sse;

use crate::bucket::copy_source;
use crate::content::{ReadOptions, read_object};
use crate::context::TestContext;
use crate::data::random_text;
use crate::error::{FixtureError, FixtureResult, SdkResultExt, ensure_eq};

const SOURCE_KEY: &str = "sourceKey";
const TARGET_KEY: &str = "targetKey";

/// How an object is encrypted at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionType {
    /// No encryption requested.
    Normal,
    /// `AES256` managed by the server.
    SseS3,
    /// `AES256` with the shared customer key.
    SseC,
}

/// Which sides of a copy request or default to SSE-S3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyEncryption {
    /// Source object written with `x-amz-server-side-encryption`.
    pub source_object: bool,
    /// Source bucket has default encryption.
    pub source_bucket: bool,
    /// Target bucket has default encryption.
    pub target_bucket: bool,
    /// Copy request asks for `x-amz-server-side-encryption`.
    pub target_object: bool,
}

/// Default-encryption configuration: `AES256`, bucket key off.
pub fn sse_s3_configuration() -> FixtureResult<ServerSideEncryptionConfiguration> {
    let default = ServerSideEncryptionByDefault::builder()
        .sse_algorithm(ServerSideEncryption::Aes256)
        .build()?;
    Ok(ServerSideEncryptionConfiguration::builder()
        .rules(
            ServerSideEncryptionRule::builder()
                .apply_server_side_encryption_by_default(default)
                .bucket_key_enabled(false)
                .build(),
        )
        .build()?)
}

/// Turn on SSE-S3 default encryption and check the rules read back unchanged.
pub async fn put_bucket_sse_s3(client: &Client, bucket: &str) -> FixtureResult<()> {
    let configuration = sse_s3_configuration()?;
    client
        .put_bucket_encryption()
        .bucket(bucket)
        .server_side_encryption_configuration(configuration.clone())
        .send()
        .await
        .op("PutBucketEncryption")?;
    let output = client
        .get_bucket_encryption()
        .bucket(bucket)
        .send()
        .await
        .op("GetBucketEncryption")?;
    ensure_eq(
        "bucket encryption rules",
        Some(configuration.rules()),
        output.server_side_encryption_configuration().map(|c| c.rules()),
    )
}

impl TestContext {
    /// Write and read back `size` bytes with the customer key over TLS.
    pub async fn verify_sse_c_write(&self, size: usize) -> FixtureResult<()> {
        let client = self.https_client();
        let bucket = self.create_bucket_with(&client).await?;
        let key = "test";
        let data = random_text(size);

        client
            .put_object()
            .bucket(&bucket)
            .key(key)
            .sse_customer_algorithm(sse::ALGORITHM)
            .sse_customer_key(sse::KEY)
            .sse_customer_key_md5(sse::KEY_MD5)
            .body(ByteStream::from(data.clone().into_bytes()))
            .send()
            .await
            .op("PutObject")?;

        let output = client
            .get_object()
            .bucket(&bucket)
            .key(key)
            .sse_customer_algorithm(sse::ALGORITHM)
            .sse_customer_key(sse::KEY)
            .sse_customer_key_md5(sse::KEY_MD5)
            .send()
            .await
            .op("GetObject")?;
        ensure_eq(
            "SSE-C key MD5",
            Some(sse::KEY_MD5),
            output.sse_customer_key_md5(),
        )?;
        let body = output.body.collect().await?.into_bytes();
        ensure_same_body(data.as_bytes(), &body)
    }

    /// Write and read back `size` bytes with `AES256` server-side encryption.
    pub async fn verify_sse_s3_write(&self, size: usize) -> FixtureResult<()> {
        let client = self.client();
        let bucket = self.create_bucket_with(&client).await?;
        let key = "test";
        let data = random_text(size);

        client
            .put_object()
            .bucket(&bucket)
            .key(key)
            .server_side_encryption(ServerSideEncryption::Aes256)
            .body(ByteStream::from(data.clone().into_bytes()))
            .send()
            .await
            .op("PutObject")?;
        let (encryption, body) = get_with_encryption(&client, &bucket, key).await?;
        ensure_eq(
            "server side encryption",
            Some(ServerSideEncryption::Aes256),
            encryption,
        )?;
        ensure_same_body(data.as_bytes(), &body)
    }

    /// Default SSE-S3 on the bucket must apply to a plain put and to a copy.
    pub async fn verify_sse_s3_copy(&self, size: usize) -> FixtureResult<()> {
        let client = self.client();
        let bucket = self.create_bucket_with(&client).await?;
        let data = random_text(size);
        put_bucket_sse_s3(&client, &bucket).await?;

        let (source_key, target_key) = ("bar", "foo");
        put_plain(&client, &bucket, source_key, &data, false).await?;
        let (encryption, source_body) = get_with_encryption(&client, &bucket, source_key).await?;
        ensure_eq(
            "source encryption",
            Some(ServerSideEncryption::Aes256),
            encryption,
        )?;

        client
            .copy_object()
            .copy_source(copy_source(&bucket, source_key, None))
            .bucket(&bucket)
            .key(target_key)
            .send()
            .await
            .op("CopyObject")?;
        let (encryption, target_body) = get_with_encryption(&client, &bucket, target_key).await?;
        ensure_eq(
            "target encryption",
            Some(ServerSideEncryption::Aes256),
            encryption,
        )?;
        ensure_same_body(&source_body, &target_body)
    }

    /// Copy between two buckets with any mix of object and bucket-default SSE-S3.
    ///
    /// An encrypted side must report `AES256`; an unencrypted one must report
    /// nothing, except on AWS where every object is encrypted.
    pub async fn verify_object_copy_between_buckets(
        &self,
        encryption: CopyEncryption,
        size: usize,
    ) -> FixtureResult<()> {
        let client = self.client();
        let source_bucket = self.create_bucket_with(&client).await?;
        let target_bucket = self.create_bucket_with(&client).await?;
        let data = random_text(size);

        if encryption.source_bucket {
            put_bucket_sse_s3(&client, &source_bucket).await?;
        }
        if encryption.target_bucket {
            put_bucket_sse_s3(&client, &target_bucket).await?;
        }

        put_plain(&client, &source_bucket, SOURCE_KEY, &data, encryption.source_object).await?;
        let (reported, source_body) = get_with_encryption(&client, &source_bucket, SOURCE_KEY).await?;
        let source_encrypted = encryption.source_object || encryption.source_bucket || self.is_aws();
        ensure_eq(
            "source encryption",
            source_encrypted.then_some(ServerSideEncryption::Aes256),
            reported,
        )?;
        ensure_same_body(data.as_bytes(), &source_body)?;

        client
            .copy_object()
            .copy_source(copy_source(&source_bucket, SOURCE_KEY, None))
            .bucket(&target_bucket)
            .key(TARGET_KEY)
            .set_server_side_encryption(
                encryption
                    .target_object
                    .then_some(ServerSideEncryption::Aes256),
            )
            .send()
            .await
            .op("CopyObject")?;
        let (reported, target_body) = get_with_encryption(&client, &target_bucket, TARGET_KEY).await?;
        let target_encrypted = encryption.target_bucket || encryption.target_object || self.is_aws();
        ensure_eq(
            "target encryption",
            target_encrypted.then_some(ServerSideEncryption::Aes256),
            reported,
        )?;
        ensure_same_body(&source_body, &target_body)
    }

    /// Copy within one bucket from a `source`-encrypted object to a
    /// `target`-encrypted one; the bodies must match.
    pub async fn verify_object_copy(
        &self,
        source: EncryptionType,
        target: EncryptionType,
        size: usize,
    ) -> FixtureResult<()> {
        let client = self.https_client();
        let bucket = self.create_bucket_with(&client).await?;
        let data = random_text(size);
        let source_sse_c = source == EncryptionType::SseC;
        let target_sse_c = target == EncryptionType::SseC;

        client
            .put_object()
            .bucket(&bucket)
            .key(SOURCE_KEY)
            .set_server_side_encryption(
                (source == EncryptionType::SseS3).then_some(ServerSideEncryption::Aes256),
            )
            .set_sse_customer_algorithm(source_sse_c.then(|| sse::ALGORITHM.to_owned()))
            .set_sse_customer_key(source_sse_c.then(|| sse::KEY.to_owned()))
            .set_sse_customer_key_md5(source_sse_c.then(|| sse::KEY_MD5.to_owned()))
            .body(ByteStream::from(data.clone().into_bytes()))
            .send()
            .await
            .op("PutObject")?;
        put_plain(&client, &bucket, "temp", &data, false).await?;

        let source_read = read_object(
            &client,
            &bucket,
            SOURCE_KEY,
            None,
            &ReadOptions::builder().sse_c(source_sse_c).build(),
        )
        .await?;
        ensure_same_body(data.as_bytes(), &source_read.body)?;

        client
            .copy_object()
            .copy_source(copy_source(&bucket, SOURCE_KEY, None))
            .bucket(&bucket)
            .key(TARGET_KEY)
            .metadata_directive(MetadataDirective::Replace)
            .set_copy_source_sse_customer_algorithm(source_sse_c.then(|| sse::ALGORITHM.to_owned()))
            .set_copy_source_sse_customer_key(source_sse_c.then(|| sse::KEY.to_owned()))
            .set_copy_source_sse_customer_key_md5(source_sse_c.then(|| sse::KEY_MD5.to_owned()))
            .set_server_side_encryption(
                (target == EncryptionType::SseS3).then_some(ServerSideEncryption::Aes256),
            )
            .set_sse_customer_algorithm(target_sse_c.then(|| sse::ALGORITHM.to_owned()))
            .set_sse_customer_key(target_sse_c.then(|| sse::KEY.to_owned()))
            .set_sse_customer_key_md5(target_sse_c.then(|| sse::KEY_MD5.to_owned()))
            .send()
            .await
            .op("CopyObject")?;

        let target_read = read_object(
            &client,
            &bucket,
            TARGET_KEY,
            None,
            &ReadOptions::builder().sse_c(target_sse_c).build(),
        )
        .await?;
        ensure_same_body(&source_read.body, &target_read.body)
    }
}

async fn put_plain(
    client: &Client,
    bucket: &str,
    key: &str,
    data: &str,
    sse_s3: bool,
) -> FixtureResult<()> {
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .set_server_side_encryption(sse_s3.then_some(ServerSideEncryption::Aes256))
        .body(ByteStream::from(data.as_bytes().to_vec()))
        .send()
        .await
        .op("PutObject")?;
    Ok(())
}

async fn get_with_encryption(
    client: &Client,
    bucket: &str,
    key: &str,
) -> FixtureResult<(Option<ServerSideEncryption>, bytes::Bytes)> {
    let output = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .op("GetObject")?;
    let encryption = output.server_side_encryption().cloned();
    let body = output.body.collect().await?.into_bytes();
    Ok((encryption, body))
}

fn ensure_same_body(expected: &[u8], actual: &[u8]) -> FixtureResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(FixtureError::mismatch(
            s3tests_core::constants::NOT_MATCHED,
            expected.len(),
            actual.len(),
        ))
    }
}
