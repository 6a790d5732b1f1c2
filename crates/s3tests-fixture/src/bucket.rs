//! Bucket and object creation helpers.

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketCannedAcl, BucketLocationConstraint, CreateBucketConfiguration, ObjectOwnership,
    PublicAccessBlockConfiguration,
};
use s3tests_auth::canonical::{canonical_uri, uri_encode};
use s3tests_core::constants::sizes::MB;
use tracing::debug;

use crate::context::TestContext;
use crate::data::random_text;
use crate::error::{FixtureError, FixtureResult, SdkResultExt};

/// Size of `create_key_with_random_content` objects when none is given.
pub const DEFAULT_RANDOM_CONTENT_SIZE: usize = 7 * MB;

const US_EAST_1: &str = "us-east-1";

impl TestContext {
    /// New bucket owned by the main user.
    pub async fn create_bucket(&self) -> FixtureResult<String> {
        self.create_bucket_with(&self.client()).await
    }

    /// New bucket created through `client`.
    pub async fn create_bucket_with(&self, client: &Client) -> FixtureResult<String> {
        let name = self.new_bucket_name();
        self.create_named_bucket(client, &name, None).await?;
        Ok(name)
    }

    /// New bucket with an object-ownership setting.
    pub async fn create_bucket_with_ownership(
        &self,
        client: &Client,
        ownership: ObjectOwnership,
    ) -> FixtureResult<String> {
        let name = self.new_bucket_name();
        self.create_named_bucket(client, &name, Some(ownership)).await?;
        Ok(name)
    }

    /// New bucket with the public access block off and an optional canned ACL.
    pub async fn create_bucket_with_acl(
        &self,
        client: &Client,
        ownership: ObjectOwnership,
        acl: Option<BucketCannedAcl>,
    ) -> FixtureResult<String> {
        let name = self.create_bucket_with_ownership(client, ownership).await?;
        disable_public_access_block(client, &name).await?;
        if let Some(acl) = acl {
            client
                .put_bucket_acl()
                .bucket(&name)
                .acl(acl)
                .send()
                .await
                .op("PutBucketAcl")?;
        }
        Ok(name)
    }

    /// `ObjectWriter` bucket that accepts canned ACLs.
    pub async fn create_bucket_canned_acl(&self, client: &Client) -> FixtureResult<String> {
        self.create_bucket_with_acl(client, ObjectOwnership::ObjectWriter, None)
            .await
    }

    /// Create `name` exactly, with the location constraint AWS needs outside `us-east-1`.
    pub async fn create_named_bucket(
        &self,
        client: &Client,
        name: &str,
        ownership: Option<ObjectOwnership>,
    ) -> FixtureResult<()> {
        let region = &self.config().region;
        let location = (self.is_aws() && region != US_EAST_1).then(|| {
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region.as_str()))
                .build()
        });
        debug!(bucket = name, ?ownership, "Creating bucket");
        client
            .create_bucket()
            .bucket(name)
            .set_object_ownership(ownership)
            .set_create_bucket_configuration(location)
            .send()
            .await
            .op("CreateBucket")?;
        Ok(())
    }

    /// New main-user bucket holding `keys`.
    pub async fn create_objects(&self, keys: &[&str]) -> FixtureResult<String> {
        let client = self.client();
        self.create_objects_with(&client, keys).await
    }

    /// New bucket holding `keys`, created through `client`.
    pub async fn create_objects_with(&self, client: &Client, keys: &[&str]) -> FixtureResult<String> {
        let bucket = self.create_bucket_with(client).await?;
        create_objects_in(client, &bucket, keys).await?;
        Ok(bucket)
    }

    /// New bucket with one object of `size` random bytes (7 MB when `None`).
    pub async fn create_key_with_random_content(
        &self,
        client: &Client,
        key: &str,
        size: Option<usize>,
    ) -> FixtureResult<String> {
        let bucket = self.create_bucket_with(client).await?;
        put_random_content(client, &bucket, key, size).await?;
        Ok(bucket)
    }

    /// Expect the SDK or the server to refuse `name`.
    pub async fn check_bad_bucket_name(&self, name: &str) -> FixtureResult<FixtureError> {
        match self.create_named_bucket(&self.client(), name, None).await {
            Ok(()) => {
                self.tracker().track(name);
                Err(FixtureError::UnexpectedSuccess {
                    operation: "CreateBucket",
                })
            }
            Err(err) => Ok(err),
        }
    }

    /// Create `prefix + name`, defaulting to the context prefix.
    pub async fn check_good_bucket_name(
        &self,
        name: &str,
        prefix: Option<&str>,
    ) -> FixtureResult<String> {
        let bucket = format!("{}{name}", prefix.unwrap_or(self.prefix()));
        self.tracker().track(&bucket);
        self.create_named_bucket(&self.client(), &bucket, None)
            .await?;
        Ok(bucket)
    }

    /// A name of exactly `len` characters must be accepted.
    pub async fn bucket_create_naming_good_long(&self, len: usize) -> FixtureResult<String> {
        let bucket = self.new_bucket_name_only(len);
        self.create_named_bucket(&self.client(), &bucket, None)
            .await?;
        Ok(bucket)
    }

    /// A name of exactly `len` characters must be rejected.
    pub async fn bucket_create_naming_bad_long(&self, len: usize) -> FixtureResult<FixtureError> {
        let bucket = self.new_bucket_name_only(len);
        self.forget_bucket(&bucket);
        self.check_bad_bucket_name(&bucket).await
    }
}

/// Turn all four public access block settings off.
pub async fn disable_public_access_block(client: &Client, bucket: &str) -> FixtureResult<()> {
    client
        .put_public_access_block()
        .bucket(bucket)
        .public_access_block_configuration(
            PublicAccessBlockConfiguration::builder()
                .block_public_acls(false)
                .ignore_public_acls(false)
                .block_public_policy(false)
                .restrict_public_buckets(false)
                .build(),
        )
        .send()
        .await
        .op("PutPublicAccessBlock")?;
    Ok(())
}

/// Put each key with its own name as the body; keys ending in `/` get an empty body.
pub async fn create_objects_in(client: &Client, bucket: &str, keys: &[&str]) -> FixtureResult<()> {
    for key in keys {
        let body = object_body_for_key(key);
        client
            .put_object()
            .bucket(bucket)
            .key(*key)
            .body(ByteStream::from(body.into_bytes()))
            .send()
            .await
            .op("PutObject")?;
    }
    Ok(())
}

/// Put `size` random characters (7 MB when `None`) and return them.
pub async fn put_random_content(
    client: &Client,
    bucket: &str,
    key: &str,
    size: Option<usize>,
) -> FixtureResult<String> {
    let size = size.filter(|s| *s > 0).unwrap_or(DEFAULT_RANDOM_CONTENT_SIZE);
    let data = random_text(size);
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data.clone().into_bytes()))
        .send()
        .await
        .op("PutObject")?;
    Ok(data)
}

/// Read an object body as text.
pub async fn get_body(client: &Client, bucket: &str, key: &str) -> FixtureResult<String> {
    get_version_body(client, bucket, key, None).await
}

/// Read one version of an object as text.
pub async fn get_version_body(
    client: &Client,
    bucket: &str,
    key: &str,
    version_id: Option<&str>,
) -> FixtureResult<String> {
    let output = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .set_version_id(version_id.map(str::to_owned))
        .send()
        .await
        .op("GetObject")?;
    let bytes = output.body.collect().await?.into_bytes();
    Ok(String::from_utf8(bytes.to_vec())?)
}

/// `CopySource` value for `bucket/key`, optionally pinned to a version.
#[must_use]
pub fn copy_source(bucket: &str, key: &str, version_id: Option<&str>) -> String {
    let key = canonical_uri(key);
    match version_id {
        Some(version_id) => format!("{bucket}/{key}?versionId={}", uri_encode(version_id)),
        None => format!("{bucket}/{key}"),
    }
}

fn object_body_for_key(key: &str) -> String {
    if key.ends_with('/') {
        String::new()
    } else {
        key.to_owned()
    }
}
