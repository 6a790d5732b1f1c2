//! Backend (replication/admin) client and replay helpers.
//!
//! A backend client identifies itself with vendor headers so the server
//! accepts administrative writes: replaying an object under a given version
//! id, writing delete markers with a chosen id, and so on.

use std::sync::Arc;

use aws_sdk_s3::Client;
use aws_sdk_s3::config::interceptors::BeforeDeserializationInterceptorContextRef;
use aws_sdk_s3::config::{
    ConfigBag, Intercept, RequestChecksumCalculation, ResponseChecksumValidation,
    RuntimeComponents,
};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{AccessControlPolicy, CompletedMultipartUpload, CompletedPart, Tagging};
use aws_smithy_runtime_api::box_error::BoxError;
use aws_smithy_runtime_api::client::orchestrator::HttpRequest;
use parking_lot::Mutex;
use s3tests_core::constants::sizes::MB;
use tracing::debug;

use crate::bucket::copy_source;
use crate::client::{ClientCredentials, ClientOptions};
use crate::error::{FixtureError, FixtureResult, SdkResultExt};

/// Vendor header names and values.
pub mod headers {
    #![allow(missing_docs)]

    pub const HEADER_DATA: &str = "NONE";

    pub const IFS_ADMIN: &str = "x-ifs-admin";
    pub const IFS_BACKEND: &str = "x-ifs-backend";
    pub const IFS_VERSION_ID: &str = "x-ifs-version-id";
    pub const IFS_DELETE_MARKER_VERSION_ID: &str = "x-ifs-delete-marker-version-id";
    pub const IFS_ADMIN_HEALTH: &str = "x-ifs-admin-health";

    pub const IFS_REPLICATION: &str = "x-ifs-replication";
    pub const IFS_LOGGING: &str = "x-ifs-logging";
    pub const IFS_LIFECYCLE: &str = "x-ifs-lifecycle";
    pub const IFS_INVENTORY: &str = "x-ifs-inventory";

    pub const KSAN_BACKEND: &str = "x-ksan-backend";
    pub const KSAN_VERSION_ID: &str = "x-ksan-version-id";
    pub const KSAN_DELETE_MARKER_VERSION_ID: &str = "x-ksan-delete-marker-version-id";
    pub const KSAN_REPLICATION: &str = "x-ksan-replication";

    pub const USER_AGENT: &str = "user-agent";
    pub const USER_AGENT_VALUE: &str = "s3tests/1.1.0";
    pub const USER_AGENT_REPLICATION: &str = "s3tests/1.1.0 replication";
    pub const USER_AGENT_LOGGING: &str = "s3tests/1.1.0 logging";
    pub const USER_AGENT_LIFECYCLE: &str = "s3tests/1.1.0 lifecycle";
    pub const USER_AGENT_INVENTORY: &str = "s3tests/1.1.0 inventory";
    pub const USER_AGENT_NOTIFICATION: &str = "s3tests/1.1.0 notification";

    pub const REPLICATION_STATUS: &str = "x-amz-replication-status";
    pub const REPLICATION_STATUS_COMPLETED: &str = "COMPLETED";
    pub const REPLICATION_STATUS_PENDING: &str = "PENDING";
    pub const REPLICATION_STATUS_FAILED: &str = "FAILED";
    pub const REPLICATION_STATUS_REPLICA: &str = "REPLICA";

    pub const S3_NOT_ACTIVATED: &str = "This S3 is not active.";
}

/// Response headers never replayed onto a backend write.
const SKIPPED_REPLAY_HEADERS: &[&str] = &[
    "content-length",
    "transfer-encoding",
    "connection",
    "keep-alive",
    "date",
    "server",
];

/// Part size of [`backend_multipart_upload`].
pub const BACKEND_PART_SIZE: usize = 5 * MB;

/// Options of the backend client: vendor headers, one attempt, SDK checksums on.
#[must_use]
pub fn backend_client_options() -> ClientOptions {
    let extra_headers = [
        (headers::IFS_ADMIN, headers::HEADER_DATA),
        (headers::IFS_BACKEND, headers::HEADER_DATA),
        (headers::KSAN_BACKEND, headers::HEADER_DATA),
        (headers::USER_AGENT, headers::USER_AGENT_VALUE),
        (headers::IFS_REPLICATION, headers::HEADER_DATA),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_owned(), value.to_owned()))
    .collect();

    ClientOptions::builder()
        .credentials(ClientCredentials::Backend)
        .checksum_calculation(RequestChecksumCalculation::WhenSupported)
        .checksum_validation(ResponseChecksumValidation::WhenSupported)
        .max_attempts(1)
        .extra_headers(extra_headers)
        .build()
}

/// Records the raw headers of the response it observes.
#[derive(Debug, Clone, Default)]
struct CaptureHeaders {
    captured: Arc<Mutex<Vec<(String, String)>>>,
}

impl CaptureHeaders {
    fn take(&self) -> Vec<(String, String)> {
        std::mem::take(&mut *self.captured.lock())
    }
}

impl Intercept for CaptureHeaders {
    fn name(&self) -> &'static str {
        "CaptureHeaders"
    }

    fn read_before_deserialization(
        &self,
        context: &BeforeDeserializationInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        let mut captured = self.captured.lock();
        captured.clear();
        captured.extend(
            context
                .response()
                .headers()
                .iter()
                .map(|(name, value)| (name.to_owned(), value.to_owned())),
        );
        Ok(())
    }
}

/// Response headers that should travel with a replayed write.
fn replay_headers(captured: Vec<(String, String)>) -> Vec<(String, String)> {
    captured
        .into_iter()
        .filter(|(name, _)| {
            !SKIPPED_REPLAY_HEADERS
                .iter()
                .any(|skip| name.eq_ignore_ascii_case(skip))
        })
        .map(|(name, value)| {
            if name.eq_ignore_ascii_case("content-type") {
                (name, value.replace("UTF-8", "utf-8"))
            } else {
                (name, value)
            }
        })
        .collect()
}

fn version_headers(version_id: &str) -> Vec<(String, String)> {
    vec![
        (headers::IFS_VERSION_ID.to_owned(), version_id.to_owned()),
        (headers::KSAN_VERSION_ID.to_owned(), version_id.to_owned()),
    ]
}

fn with_headers(headers: Vec<(String, String)>) -> impl Fn(&mut HttpRequest) + Send + Sync + 'static {
    move |request: &mut HttpRequest| {
        for (name, value) in &headers {
            request.headers_mut().insert(name.clone(), value.clone());
        }
    }
}

/// Read a source version and write it to the target under the same version id,
/// replaying the source response headers.
pub async fn backend_put_object(
    client: &Client,
    source_bucket: &str,
    source_key: &str,
    target_bucket: &str,
    target_key: &str,
    version_id: &str,
) -> FixtureResult<()> {
    let capture = CaptureHeaders::default();
    let source = client
        .get_object()
        .bucket(source_bucket)
        .key(source_key)
        .version_id(version_id)
        .customize()
        .interceptor(capture.clone())
        .send()
        .await
        .op("GetObject")?;
    let metadata = source.metadata().cloned();
    let body = source.body.collect().await?.into_bytes();

    let mut headers = replay_headers(capture.take());
    headers.extend(version_headers(version_id));
    debug!(target_bucket, target_key, version_id, headers = headers.len(), "Backend put object");

    client
        .put_object()
        .bucket(target_bucket)
        .key(target_key)
        .set_metadata(metadata)
        .body(ByteStream::from(body))
        .customize()
        .mutate_request(with_headers(headers))
        .send()
        .await
        .op("PutObject")?;
    Ok(())
}

/// Server-side copy that stamps the target with `target_version_id`.
pub async fn backend_copy_object(
    client: &Client,
    source_bucket: &str,
    source_key: &str,
    target_bucket: &str,
    target_key: &str,
    source_version_id: &str,
    target_version_id: &str,
) -> FixtureResult<()> {
    client
        .copy_object()
        .copy_source(copy_source(source_bucket, source_key, Some(source_version_id)))
        .bucket(target_bucket)
        .key(target_key)
        .customize()
        .mutate_request(with_headers(version_headers(target_version_id)))
        .send()
        .await
        .op("CopyObject")?;
    Ok(())
}

/// Replay a source version as a multipart upload of ranged reads.
pub async fn backend_multipart_upload(
    client: &Client,
    source_bucket: &str,
    source_key: &str,
    target_bucket: &str,
    target_key: &str,
    version_id: &str,
) -> FixtureResult<()> {
    let capture = CaptureHeaders::default();
    let head = client
        .head_object()
        .bucket(source_bucket)
        .key(source_key)
        .version_id(version_id)
        .customize()
        .interceptor(capture.clone())
        .send()
        .await
        .op("HeadObject")?;
    let size = usize::try_from(head.content_length().unwrap_or_default()).unwrap_or_default();

    let created = client
        .create_multipart_upload()
        .bucket(target_bucket)
        .key(target_key)
        .set_metadata(head.metadata().cloned())
        .customize()
        .mutate_request(with_headers(replay_headers(capture.take())))
        .send()
        .await
        .op("CreateMultipartUpload")?;
    let upload_id = created
        .upload_id()
        .ok_or(FixtureError::MissingField("UploadId"))?
        .to_owned();

    let mut parts = Vec::new();
    for range in crate::data::split_ranges(size, BACKEND_PART_SIZE) {
        let part_number = i32::try_from(parts.len() + 1).unwrap_or(i32::MAX);
        let chunk = client
            .get_object()
            .bucket(source_bucket)
            .key(source_key)
            .version_id(version_id)
            .range(range.header())
            .send()
            .await
            .op("GetObject")?
            .body
            .collect()
            .await?
            .into_bytes();
        let uploaded = client
            .upload_part()
            .bucket(target_bucket)
            .key(target_key)
            .upload_id(&upload_id)
            .part_number(part_number)
            .body(ByteStream::from(chunk))
            .send()
            .await
            .op("UploadPart")?;
        parts.push(
            CompletedPart::builder()
                .part_number(part_number)
                .set_e_tag(uploaded.e_tag().map(str::to_owned))
                .build(),
        );
    }

    client
        .complete_multipart_upload()
        .bucket(target_bucket)
        .key(target_key)
        .upload_id(&upload_id)
        .multipart_upload(
            CompletedMultipartUpload::builder()
                .set_parts(Some(parts))
                .build(),
        )
        .customize()
        .mutate_request(with_headers(version_headers(version_id)))
        .send()
        .await
        .op("CompleteMultipartUpload")?;
    Ok(())
}

/// Copy a source version's ACL onto the same version id of the target.
pub async fn backend_put_object_acl(
    client: &Client,
    source_bucket: &str,
    source_key: &str,
    target_bucket: &str,
    target_key: &str,
    version_id: &str,
) -> FixtureResult<()> {
    let acl = client
        .get_object_acl()
        .bucket(source_bucket)
        .key(source_key)
        .version_id(version_id)
        .send()
        .await
        .op("GetObjectAcl")?;
    let policy = AccessControlPolicy::builder()
        .set_owner(acl.owner().cloned())
        .set_grants(Some(acl.grants().to_vec()))
        .build();
    client
        .put_object_acl()
        .bucket(target_bucket)
        .key(target_key)
        .version_id(version_id)
        .access_control_policy(policy)
        .send()
        .await
        .op("PutObjectAcl")?;
    Ok(())
}

/// Copy a source version's tag set onto the same version id of the target.
pub async fn backend_put_object_tagging(
    client: &Client,
    source_bucket: &str,
    source_key: &str,
    target_bucket: &str,
    target_key: &str,
    version_id: &str,
) -> FixtureResult<()> {
    let tags = client
        .get_object_tagging()
        .bucket(source_bucket)
        .key(source_key)
        .version_id(version_id)
        .send()
        .await
        .op("GetObjectTagging")?;
    let tagging = Tagging::builder()
        .set_tag_set(Some(tags.tag_set().to_vec()))
        .build()?;
    client
        .put_object_tagging()
        .bucket(target_bucket)
        .key(target_key)
        .version_id(version_id)
        .tagging(tagging)
        .send()
        .await
        .op("PutObjectTagging")?;
    Ok(())
}

/// Write a delete marker carrying `version_id`.
pub async fn backend_delete_object(
    client: &Client,
    bucket: &str,
    key: &str,
    version_id: &str,
) -> FixtureResult<()> {
    let marker_headers = vec![
        (
            headers::IFS_DELETE_MARKER_VERSION_ID.to_owned(),
            version_id.to_owned(),
        ),
        (
            headers::KSAN_DELETE_MARKER_VERSION_ID.to_owned(),
            version_id.to_owned(),
        ),
    ];
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from_static(b""))
        .customize()
        .mutate_request(with_headers(marker_headers))
        .send()
        .await
        .op("PutObject")?;
    Ok(())
}

/// Remove the tag set of one version.
pub async fn backend_delete_object_tagging(
    client: &Client,
    bucket: &str,
    key: &str,
    version_id: &str,
) -> FixtureResult<()> {
    client
        .delete_object_tagging()
        .bucket(bucket)
        .key(key)
        .version_id(version_id)
        .send()
        .await
        .op("DeleteObjectTagging")?;
    Ok(())
}
