//! Versioning helpers: status polling, version bookkeeping and concurrent
//! create/delete races.

use std::time::Duration;

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketVersioningStatus, VersioningConfiguration};
use futures::future::join_all;
use s3tests_core::constants::NULL_VERSION;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::bucket::get_version_body;
use crate::error::{FixtureError, FixtureResult, SdkResultExt, ensure_eq};

/// Reads issued by [`check_configure_versioning_retry`] before giving up.
pub const VERSIONING_POLL_ATTEMPTS: usize = 5;

/// Pause between versioning status reads.
pub const VERSIONING_POLL_DELAY: Duration = Duration::from_millis(1000);

/// Version ids written by a test and the body each one holds, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionLedger {
    /// Version ids in write order.
    pub version_ids: Vec<String>,
    /// Body of the matching version.
    pub contents: Vec<String>,
}

impl VersionLedger {
    /// Record a write.
    pub fn push(&mut self, version_id: impl Into<String>, content: impl Into<String>) {
        self.version_ids.push(version_id.into());
        self.contents.push(content.into());
    }

    /// Remove and return the `(version_id, content)` entry at `index`.
    pub fn remove(&mut self, index: usize) -> Option<(String, String)> {
        if index >= self.version_ids.len() || index >= self.contents.len() {
            return None;
        }
        Some((self.version_ids.remove(index), self.contents.remove(index)))
    }

    /// Forget every `null` version, as a write to a suspended bucket replaces it.
    pub fn drop_null_versions(&mut self) {
        let mut kept = self
            .version_ids
            .drain(..)
            .zip(self.contents.drain(..))
            .filter(|(id, _)| id != NULL_VERSION)
            .collect::<Vec<_>>();
        for (id, content) in kept.drain(..) {
            self.push(id, content);
        }
    }

    /// Number of recorded versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.version_ids.len()
    }

    /// Whether nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.version_ids.is_empty()
    }

    fn ensure_consistent(&self) -> FixtureResult<()> {
        ensure_eq(
            "ledger length",
            self.version_ids.len(),
            self.contents.len(),
        )
    }
}

/// Set the versioning status, then poll until the server reports it.
///
/// Up to [`VERSIONING_POLL_ATTEMPTS`] reads, [`VERSIONING_POLL_DELAY`] apart.
/// A failed read counts as a mismatch.
pub async fn check_configure_versioning_retry(
    client: &Client,
    bucket: &str,
    status: BucketVersioningStatus,
) -> FixtureResult<()> {
    client
        .put_bucket_versioning()
        .bucket(bucket)
        .versioning_configuration(
            VersioningConfiguration::builder()
                .status(status.clone())
                .build(),
        )
        .send()
        .await
        .op("PutBucketVersioning")?;

    let mut read_status = None;
    for attempt in 1..=VERSIONING_POLL_ATTEMPTS {
        read_status = match client
            .get_bucket_versioning()
            .bucket(bucket)
            .send()
            .await
            .op("GetBucketVersioning")
        {
            Ok(output) => output.status().cloned(),
            Err(err) => {
                debug!(%bucket, attempt, error = %err, "Versioning status read failed");
                None
            }
        };
        if read_status.as_ref() == Some(&status) {
            break;
        }
        if attempt < VERSIONING_POLL_ATTEMPTS {
            debug!(%bucket, attempt, expected = ?status, actual = ?read_status, "Versioning status not applied yet");
            tokio::time::sleep(VERSIONING_POLL_DELAY).await;
        }
    }
    ensure_eq("versioning status", Some(status), read_status)
}

/// The given version of `key` must hold `content`.
pub async fn check_obj_content(
    client: &Client,
    bucket: &str,
    key: &str,
    version_id: Option<&str>,
    content: &str,
) -> FixtureResult<()> {
    let body = get_version_body(client, bucket, key, version_id).await?;
    ensure_eq(
        &format!("content of {key} version {version_id:?}"),
        content,
        body.as_str(),
    )
}

/// The bucket's versions, oldest first, must match `ledger` in id and content.
pub async fn check_obj_versions(
    client: &Client,
    bucket: &str,
    key: &str,
    ledger: &VersionLedger,
) -> FixtureResult<()> {
    ledger.ensure_consistent()?;
    let output = client
        .list_object_versions()
        .bucket(bucket)
        .send()
        .await
        .op("ListObjectVersions")?;
    let mut versions = output.versions().to_vec();
    versions.reverse();
    ensure_eq("version count", ledger.len(), versions.len())?;

    for (i, version) in versions.iter().enumerate() {
        ensure_eq(
            &format!("version[{i}] id"),
            Some(ledger.version_ids[i].as_str()),
            version.version_id(),
        )?;
        if !key.is_empty() {
            ensure_eq(&format!("version[{i}] key"), Some(key), version.key())?;
        }
        check_obj_content(client, bucket, key, version.version_id(), &ledger.contents[i]).await?;
    }
    Ok(())
}

/// Write `n` versions with bodies `content-{i}` and return what was written.
pub async fn create_multiple_versions(
    client: &Client,
    bucket: &str,
    key: &str,
    n: usize,
    check: bool,
) -> FixtureResult<VersionLedger> {
    let mut ledger = VersionLedger::default();
    for i in 0..n {
        let body = format!("content-{i}");
        let version_id = put_version(client, bucket, key, &body).await?;
        ledger.push(version_id, body);
    }
    if check {
        check_obj_versions(client, bucket, key, &ledger).await?;
    }
    Ok(ledger)
}

/// Write `n` versions that all hold `body`.
pub async fn create_multiple_versions_with_body(
    client: &Client,
    bucket: &str,
    key: &str,
    n: usize,
    body: &str,
    check: bool,
) -> FixtureResult<VersionLedger> {
    let mut ledger = VersionLedger::default();
    for _ in 0..n {
        let version_id = put_version(client, bucket, key, body).await?;
        ledger.push(version_id, body);
    }
    if check {
        check_obj_versions(client, bucket, key, &ledger).await?;
    }
    Ok(ledger)
}

/// Delete the version at `index`, after checking its content, and re-check
/// whatever remains.
pub async fn remove_obj_version(
    client: &Client,
    bucket: &str,
    key: &str,
    ledger: &mut VersionLedger,
    index: usize,
) -> FixtureResult<()> {
    ledger.ensure_consistent()?;
    let len = ledger.len();
    let (version_id, content) = ledger
        .remove(index)
        .ok_or_else(|| FixtureError::mismatch("version index", format!("< {len}"), index))?;

    check_obj_content(client, bucket, key, Some(&version_id), &content).await?;
    client
        .delete_object()
        .bucket(bucket)
        .key(key)
        .version_id(&version_id)
        .send()
        .await
        .op("DeleteObject")?;

    if !ledger.is_empty() {
        check_obj_versions(client, bucket, key, ledger).await?;
    }
    Ok(())
}

/// Write `n` versions, then remove them one by one starting at `start` and
/// moving the index by `step` after each removal.
pub async fn do_test_create_remove_versions(
    client: &Client,
    bucket: &str,
    key: &str,
    n: usize,
    start: isize,
    step: isize,
) -> FixtureResult<()> {
    let mut ledger = create_multiple_versions(client, bucket, key, n, true).await?;
    let mut index = start;
    for _ in 0..n {
        let position = usize::try_from(index)
            .map_err(|_| FixtureError::mismatch("version index", "non-negative", index))?;
        remove_obj_version(client, bucket, key, &mut ledger, position).await?;
        index += step;
    }
    Ok(())
}

/// Delete `key` in a suspended bucket; the `null` version goes away.
pub async fn delete_suspended_versioning_obj(
    client: &Client,
    bucket: &str,
    key: &str,
    ledger: &mut VersionLedger,
) -> FixtureResult<()> {
    client
        .delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .op("DeleteObject")?;
    ledger.ensure_consistent()?;
    ledger.drop_null_versions();
    Ok(())
}

/// Overwrite `key` in a suspended bucket; the new body becomes the only `null` version.
pub async fn overwrite_suspended_versioning_obj(
    client: &Client,
    bucket: &str,
    key: &str,
    ledger: &mut VersionLedger,
    content: &str,
) -> FixtureResult<()> {
    put_version(client, bucket, key, content).await?;
    ledger.ensure_consistent()?;
    ledger.drop_null_versions();
    ledger.push(NULL_VERSION, content);
    Ok(())
}

/// Put `{key}{i}` with body `data {i}` for `i in 0..n`, each on its own task.
#[must_use]
pub fn create_versioned_obj_concurrent(
    client: &Client,
    bucket: &str,
    key: &str,
    n: usize,
) -> Vec<JoinHandle<FixtureResult<()>>> {
    (0..n)
        .map(|i| {
            let client = client.clone();
            let bucket = bucket.to_owned();
            let key = format!("{key}{i}");
            tokio::spawn(async move {
                put_version(&client, &bucket, &key, &format!("data {i}")).await?;
                Ok::<_, FixtureError>(())
            })
        })
        .collect()
}

/// List the bucket's versions and delete each one on its own task.
pub async fn clear_versioned_bucket_concurrent(
    client: &Client,
    bucket: &str,
) -> FixtureResult<Vec<JoinHandle<FixtureResult<()>>>> {
    let output = client
        .list_object_versions()
        .bucket(bucket)
        .send()
        .await
        .op("ListObjectVersions")?;
    Ok(output
        .versions()
        .iter()
        .filter_map(|v| Some((v.key()?.to_owned(), v.version_id().map(str::to_owned))))
        .map(|(key, version_id)| {
            let client = client.clone();
            let bucket = bucket.to_owned();
            tokio::spawn(async move {
                client
                    .delete_object()
                    .bucket(bucket)
                    .key(key)
                    .set_version_id(version_id)
                    .send()
                    .await
                    .op("DeleteObject")?;
                Ok::<_, FixtureError>(())
            })
        })
        .collect())
}

/// Wait for every task and surface the first failure.
///
/// ```
/// use s3tests_fixture::versioning::join_tasks;
///
/// # tokio_test::block_on(async {
/// let handles = (0..3).map(|_| tokio::spawn(async { Ok(()) })).collect();
/// join_tasks(handles).await.unwrap();
/// # });
/// ```
pub async fn join_tasks(handles: Vec<JoinHandle<FixtureResult<()>>>) -> FixtureResult<()> {
    for result in join_all(handles).await {
        result??;
    }
    Ok(())
}

async fn put_version(client: &Client, bucket: &str, key: &str, body: &str) -> FixtureResult<String> {
    let output = client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body.as_bytes().to_vec()))
        .send()
        .await
        .op("PutObject")?;
    Ok(output.version_id().unwrap_or(NULL_VERSION).to_owned())
}
