//! Per-test fixture state: clients, bucket naming and teardown.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use aws_sdk_s3::Client;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::Mutex;
use s3tests_core::S3Config;
use tracing::{debug, info, warn};

use crate::client::{ClientFactory, ClientOptions};
use crate::data::random_text;
use crate::error::{FixtureError, FixtureResult, SdkResultExt};
use crate::time;

/// Longest legal bucket name.
pub const BUCKET_MAX_LENGTH: usize = 63;

/// Placeholder in `BucketPrefix` replaced by random text.
pub const RANDOM_PLACEHOLDER: &str = "{random}";

const RANDOM_PREFIX_LENGTH: usize = 15;

/// Bucket names created during a test, shared with spawned tasks.
#[derive(Debug, Clone, Default)]
pub struct BucketTracker {
    names: Arc<Mutex<Vec<String>>>,
}

impl BucketTracker {
    /// Register a bucket for teardown.
    pub fn track(&self, name: impl Into<String>) {
        let name = name.into();
        let mut names = self.names.lock();
        if !names.contains(&name) {
            names.push(name);
        }
    }

    /// Forget a bucket the test already deleted.
    pub fn untrack(&self, name: &str) {
        self.names.lock().retain(|n| n != name);
    }

    /// Snapshot of tracked names, in creation order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.names.lock().clone()
    }

    fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.names.lock())
    }
}

/// Everything one test needs: configuration, clients and tracked buckets.
///
/// Call [`TestContext::teardown`] at the end of the test to remove every bucket
/// it created, or wrap the test body in [`TestContext::run`] so cleanup also
/// happens when the body panics. Clones share one bucket tracker.
#[derive(Debug, Clone)]
pub struct TestContext {
    config: Arc<S3Config>,
    clients: ClientFactory,
    buckets: BucketTracker,
    prefix: String,
}

impl TestContext {
    /// Context for one test.
    #[must_use]
    pub fn new(config: Arc<S3Config>) -> Self {
        let prefix = resolve_prefix(&config.bucket_prefix);
        debug!(%prefix, "Test start");
        Self {
            clients: ClientFactory::new(Arc::clone(&config)),
            config,
            buckets: BucketTracker::default(),
            prefix,
        }
    }

    /// Loaded settings.
    #[must_use]
    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Client factory bound to the settings.
    #[must_use]
    pub fn clients(&self) -> &ClientFactory {
        &self.clients
    }

    /// Bucket tracker, cloneable into spawned tasks.
    #[must_use]
    pub fn tracker(&self) -> &BucketTracker {
        &self.buckets
    }

    /// Main user client.
    #[must_use]
    pub fn client(&self) -> Client {
        self.clients.client()
    }

    /// Alt user client.
    #[must_use]
    pub fn alt_client(&self) -> Client {
        self.clients.alt_client()
    }

    /// Main user client over TLS.
    #[must_use]
    pub fn https_client(&self) -> Client {
        self.clients.https_client()
    }

    /// Backend client.
    #[must_use]
    pub fn backend_client(&self) -> Client {
        self.clients.backend_client()
    }

    /// Client with an unknown key pair.
    #[must_use]
    pub fn bad_auth_client(&self, access_key: Option<&str>, secret_key: Option<&str>) -> Client {
        self.clients.bad_auth_client(access_key, secret_key)
    }

    /// Anonymous client.
    pub async fn public_client(&self) -> Client {
        self.clients.public_client().await
    }

    /// Client with explicit options.
    pub async fn client_with(&self, options: ClientOptions) -> Client {
        self.clients.client_with(options).await
    }

    /// Bucket prefix with `{random}` already substituted.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether the target is real AWS.
    #[must_use]
    pub fn is_aws(&self) -> bool {
        self.config.is_aws()
    }

    /// Lifecycle expiration `days` from now, as the target reports it.
    #[must_use]
    pub fn expired_date(&self, days: i64) -> DateTime<Utc> {
        time::expired_date(days, self.is_aws())
    }

    /// A fresh bucket name, tracked for teardown.
    #[must_use]
    pub fn new_bucket_name(&self) -> String {
        let name = self.new_bucket_name_untracked();
        self.buckets.track(&name);
        name
    }

    /// A fresh bucket name that is not tracked, for names expected to be rejected.
    #[must_use]
    pub fn new_bucket_name_untracked(&self) -> String {
        generate_bucket_name(&self.prefix)
    }

    /// A fresh name of exactly `len` characters, tracked for teardown.
    #[must_use]
    pub fn new_bucket_name_only(&self, len: usize) -> String {
        let name = bucket_name_of_length(&self.prefix, len);
        self.buckets.track(&name);
        name
    }

    /// Stop tracking a bucket the test deleted itself.
    pub fn forget_bucket(&self, name: &str) {
        self.buckets.untrack(name);
    }

    /// Remove every tracked bucket unless `NotDelete` is set.
    ///
    /// Failures are logged and never returned.
    pub async fn teardown(self) {
        let buckets = self.buckets.drain();
        info!(?buckets, "Test End");
        if self.config.not_delete {
            return;
        }
        let client = self.client();
        for bucket in buckets {
            if let Err(err) = clear_bucket(&client, &bucket).await {
                warn!(%bucket, status = ?err.status(), code = ?err.code(), error = %err, "Bucket clear failed");
            }
            if let Err(err) = client.delete_bucket().bucket(&bucket).send().await.op("DeleteBucket") {
                warn!(%bucket, status = ?err.status(), code = ?err.code(), error = %err, "Bucket delete failed");
            }
        }
    }

    /// Run `test` and tear down afterwards, even when `test` panics.
    ///
    /// A panic is resumed once the buckets are cleaned up.
    pub async fn run<F, Fut, T>(self, test: F) -> T
    where
        F: FnOnce(TestContext) -> Fut,
        Fut: Future<Output = T>,
    {
        let guard = self.clone();
        let outcome = AssertUnwindSafe(test(self)).catch_unwind().await;
        guard.teardown().await;
        match outcome {
            Ok(value) => value,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Delete every version, delete marker and in-progress upload in `bucket`.
pub async fn clear_bucket(client: &Client, bucket: &str) -> FixtureResult<()> {
    let mut key_marker: Option<String> = None;
    let mut version_marker: Option<String> = None;
    loop {
        let page = client
            .list_object_versions()
            .bucket(bucket)
            .set_key_marker(key_marker.take())
            .set_version_id_marker(version_marker.take())
            .send()
            .await
            .op("ListObjectVersions")?;

        let versions = page
            .versions()
            .iter()
            .map(|v| (v.key(), v.version_id()))
            .chain(page.delete_markers().iter().map(|m| (m.key(), m.version_id())));
        for (key, version_id) in versions {
            let Some(key) = key else { continue };
            client
                .delete_object()
                .bucket(bucket)
                .key(key)
                .set_version_id(version_id.map(str::to_owned))
                .bypass_governance_retention(true)
                .send()
                .await
                .op("DeleteObject")?;
        }

        if page.is_truncated() != Some(true) {
            break;
        }
        key_marker = page.next_key_marker().map(str::to_owned);
        version_marker = page.next_version_id_marker().map(str::to_owned);
        if key_marker.is_none() && version_marker.is_none() {
            break;
        }
    }

    let uploads = client
        .list_multipart_uploads()
        .bucket(bucket)
        .send()
        .await
        .op("ListMultipartUploads")?;
    for upload in uploads.uploads() {
        let (Some(key), Some(upload_id)) = (upload.key(), upload.upload_id()) else {
            continue;
        };
        client
            .abort_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .op("AbortMultipartUpload")?;
    }
    Ok(())
}

/// Delete `keys` with one `DeleteObjects` request.
pub async fn delete_objects(client: &Client, bucket: &str, keys: &[&str]) -> FixtureResult<()> {
    let objects = keys
        .iter()
        .map(|key| ObjectIdentifier::builder().key(*key).build())
        .collect::<Result<Vec<_>, _>>()?;
    let delete = Delete::builder().set_objects(Some(objects)).build()?;
    let output = client
        .delete_objects()
        .bucket(bucket)
        .delete(delete)
        .send()
        .await
        .op("DeleteObjects")?;
    if let Some(error) = output.errors().first() {
        return Err(FixtureError::mismatch(
            "DeleteObjects errors",
            Vec::<String>::new(),
            vec![format!("{:?}: {:?}", error.key(), error.code())],
        ));
    }
    Ok(())
}

fn resolve_prefix(configured: &str) -> String {
    configured.replace(RANDOM_PLACEHOLDER, &random_text(RANDOM_PREFIX_LENGTH))
}

fn generate_bucket_name(prefix: &str) -> String {
    let mut name = format!("{prefix}{}", random_text(BUCKET_MAX_LENGTH));
    name.truncate(BUCKET_MAX_LENGTH - 1);
    name
}

fn bucket_name_of_length(prefix: &str, len: usize) -> String {
    let mut name = generate_bucket_name(prefix);
    if name.len() > len {
        name.truncate(len);
    } else if name.len() < len {
        name.push_str(&random_text(len - name.len()));
    }
    name
}
