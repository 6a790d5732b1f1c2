//! Order-independent comparison of server responses.
//!
//! Grant and tag lists come back in whatever order the server stores them.
//! Both sides are sorted by a derived key (descending) before being compared
//! pairwise.

use aws_sdk_s3::types::{
    AccessControlPolicy, CompletedPart, Grant, LifecycleRule, ObjectLockConfiguration,
    ObjectLockRetention, ObjectVersion, Owner, Part, Permission, ReplicationConfiguration, Tag,
};

use crate::checksums::{ChecksumAlgorithm, ResponseChecksums, compute_checksum};
use crate::context::TestContext;
use crate::error::{FixtureResult, SdkResultExt, ensure_eq};

/// Sort grants by grantee id plus permission, descending.
#[must_use]
pub fn grants_sort(mut grants: Vec<Grant>) -> Vec<Grant> {
    grants.sort_by_cached_key(|g| std::cmp::Reverse(grant_sort_key(g)));
    grants
}

fn grant_sort_key(grant: &Grant) -> String {
    let id = grant.grantee().and_then(|g| g.id()).unwrap_or_default();
    let permission = grant.permission().map(Permission::as_str).unwrap_or_default();
    format!("{id}{permission}")
}

/// Same grants regardless of order: permission, grantee id and grantee type.
pub fn check_grants(expected: &[Grant], actual: &[Grant]) -> FixtureResult<()> {
    ensure_eq("grant count", expected.len(), actual.len())?;
    let expected = grants_sort(expected.to_vec());
    let actual = grants_sort(actual.to_vec());
    for (i, (e, a)) in expected.iter().zip(&actual).enumerate() {
        ensure_eq(&format!("grant[{i}] permission"), e.permission(), a.permission())?;
        ensure_eq(
            &format!("grant[{i}] grantee id"),
            e.grantee().and_then(|g| g.id()),
            a.grantee().and_then(|g| g.id()),
        )?;
        ensure_eq(
            &format!("grant[{i}] grantee type"),
            e.grantee().map(|g| g.r#type()),
            a.grantee().map(|g| g.r#type()),
        )?;
    }
    Ok(())
}

/// Compare two ACLs. On AWS the owner is compared by id only since display
/// names are not returned in every region.
pub fn check_acl(
    expected: &AccessControlPolicy,
    actual: &AccessControlPolicy,
    is_aws: bool,
) -> FixtureResult<()> {
    if is_aws {
        ensure_eq(
            "owner id",
            expected.owner().and_then(Owner::id),
            actual.owner().and_then(Owner::id),
        )?;
    } else {
        ensure_eq("owner", expected.owner(), actual.owner())?;
    }
    check_grants(expected.grants(), actual.grants())
}

/// Reassemble an ACL from the owner and grants of a `Get*Acl` response.
#[must_use]
pub fn acl_from_parts(owner: Option<&Owner>, grants: &[Grant]) -> AccessControlPolicy {
    AccessControlPolicy::builder()
        .set_owner(owner.cloned())
        .set_grants(Some(grants.to_vec()))
        .build()
}

impl TestContext {
    /// [`check_acl`] with the target's AWS flag.
    pub fn check_acl(
        &self,
        expected: &AccessControlPolicy,
        actual: &AccessControlPolicy,
    ) -> FixtureResult<()> {
        check_acl(expected, actual, self.is_aws())
    }

    /// Put an alt-user ACL with `permission` on a new bucket and read it back.
    pub async fn check_bucket_acl(&self, permission: Permission) -> FixtureResult<()> {
        let client = self.client();
        let bucket = self.create_bucket_canned_acl(&client).await?;
        let acl = self.create_alt_acl(&[permission])?;
        client
            .put_bucket_acl()
            .bucket(&bucket)
            .access_control_policy(acl.clone())
            .send()
            .await
            .op("PutBucketAcl")?;
        let response = client
            .get_bucket_acl()
            .bucket(&bucket)
            .send()
            .await
            .op("GetBucketAcl")?;
        self.check_acl(&acl, &acl_from_parts(response.owner(), response.grants()))
    }

    /// Put a main-user ACL with `permission` on a new object and read it back.
    pub async fn check_object_acl(&self, permission: Permission) -> FixtureResult<()> {
        let client = self.client();
        let bucket = self.create_bucket_canned_acl(&client).await?;
        let key = format!("testObjectPermission{}", permission.as_str());
        let main = &self.config().main_user;
        let acl = crate::acl::create_acl(
            &crate::acl::owner(main),
            &crate::acl::user_grantee(main)?,
            &[permission],
        )?;
        crate::bucket::create_objects_in(&client, &bucket, &[key.as_str()]).await?;
        client
            .put_object_acl()
            .bucket(&bucket)
            .key(&key)
            .access_control_policy(acl.clone())
            .send()
            .await
            .op("PutObjectAcl")?;
        let response = client
            .get_object_acl()
            .bucket(&bucket)
            .key(&key)
            .send()
            .await
            .op("GetObjectAcl")?;
        self.check_acl(&acl, &acl_from_parts(response.owner(), response.grants()))
    }
}

/// Sort tags by key plus value, descending.
#[must_use]
pub fn tagging_sort(mut tags: Vec<Tag>) -> Vec<Tag> {
    tags.sort_by_cached_key(|t| std::cmp::Reverse(format!("{}{}", t.key(), t.value())));
    tags
}

/// Same tag set regardless of order.
pub fn tag_compare(expected: &[Tag], actual: &[Tag]) -> FixtureResult<()> {
    ensure_eq("tag count", expected.len(), actual.len())?;
    let expected = tagging_sort(expected.to_vec());
    let actual = tagging_sort(actual.to_vec());
    for (i, (e, a)) in expected.iter().zip(&actual).enumerate() {
        ensure_eq(&format!("tag[{i}] key"), e.key(), a.key())?;
        ensure_eq(&format!("tag[{i}] value"), e.value(), a.value())?;
    }
    Ok(())
}

/// Compare lifecycle rules in order.
///
/// Noncurrent expiration and abort-incomplete-upload settings are only
/// checked when the expected rule carries them.
pub fn prefix_lifecycle_configuration_check(
    expected: &[LifecycleRule],
    actual: &[LifecycleRule],
) -> FixtureResult<()> {
    ensure_eq("rule count", expected.len(), actual.len())?;
    for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
        ensure_eq(&format!("rule[{i}] id"), e.id(), a.id())?;
        let (ee, ae) = (e.expiration(), a.expiration());
        ensure_eq(
            &format!("rule[{i}] expiration date"),
            ee.and_then(|x| x.date()),
            ae.and_then(|x| x.date()),
        )?;
        ensure_eq(
            &format!("rule[{i}] expiration days"),
            ee.and_then(|x| x.days()),
            ae.and_then(|x| x.days()),
        )?;
        ensure_eq(
            &format!("rule[{i}] expired object delete marker"),
            ee.and_then(|x| x.expired_object_delete_marker()),
            ae.and_then(|x| x.expired_object_delete_marker()),
        )?;
        ensure_eq(
            &format!("rule[{i}] prefix"),
            e.filter().and_then(|f| f.prefix()),
            a.filter().and_then(|f| f.prefix()),
        )?;
        ensure_eq(&format!("rule[{i}] status"), e.status(), a.status())?;
        if let Some(noncurrent) = e.noncurrent_version_expiration() {
            ensure_eq(
                &format!("rule[{i}] noncurrent days"),
                noncurrent.noncurrent_days(),
                a.noncurrent_version_expiration()
                    .and_then(|x| x.noncurrent_days()),
            )?;
        }
        if let Some(abort) = e.abort_incomplete_multipart_upload() {
            ensure_eq(
                &format!("rule[{i}] days after initiation"),
                abort.days_after_initiation(),
                a.abort_incomplete_multipart_upload()
                    .and_then(|x| x.days_after_initiation()),
            )?;
        }
    }
    Ok(())
}

/// Compare object lock configurations: enabled flag and default retention.
pub fn lock_compare(
    expected: &ObjectLockConfiguration,
    actual: &ObjectLockConfiguration,
) -> FixtureResult<()> {
    ensure_eq(
        "object lock enabled",
        expected.object_lock_enabled(),
        actual.object_lock_enabled(),
    )?;
    let retention = |c: &ObjectLockConfiguration| c.rule().and_then(|r| r.default_retention()).cloned();
    let (e, a) = (retention(expected), retention(actual));
    ensure_eq(
        "default retention mode",
        e.as_ref().and_then(|r| r.mode()),
        a.as_ref().and_then(|r| r.mode()),
    )?;
    ensure_eq(
        "default retention years",
        e.as_ref().and_then(|r| r.years()),
        a.as_ref().and_then(|r| r.years()),
    )?;
    ensure_eq(
        "default retention days",
        e.as_ref().and_then(|r| r.days()),
        a.as_ref().and_then(|r| r.days()),
    )
}

/// Compare retention mode and retain-until date.
pub fn retention_compare(
    expected: &ObjectLockRetention,
    actual: &ObjectLockRetention,
) -> FixtureResult<()> {
    ensure_eq("retention mode", expected.mode(), actual.mode())?;
    ensure_eq(
        "retain until date",
        expected.retain_until_date(),
        actual.retain_until_date(),
    )
}

/// Compare the role and every rule of two replication configurations.
pub fn replication_config_compare(
    expected: &ReplicationConfiguration,
    actual: &ReplicationConfiguration,
) -> FixtureResult<()> {
    ensure_eq("replication role", expected.role(), actual.role())?;
    ensure_eq(
        "replication rule count",
        expected.rules().len(),
        actual.rules().len(),
    )?;
    for (i, (e, a)) in expected.rules().iter().zip(actual.rules()).enumerate() {
        ensure_eq(
            &format!("rule[{i}] delete marker replication"),
            e.delete_marker_replication(),
            a.delete_marker_replication(),
        )?;
        ensure_eq(
            &format!("rule[{i}] destination"),
            e.destination(),
            a.destination(),
        )?;
        ensure_eq(
            &format!("rule[{i}] existing object replication"),
            e.existing_object_replication(),
            a.existing_object_replication(),
        )?;
        ensure_eq(&format!("rule[{i}] filter"), e.filter(), a.filter())?;
        ensure_eq(
            &format!("rule[{i}] source selection criteria"),
            e.source_selection_criteria(),
            a.source_selection_criteria(),
        )?;
        ensure_eq(&format!("rule[{i}] status"), e.status(), a.status())?;
    }
    Ok(())
}

/// Compare uploaded parts with a `ListParts` result, ignoring ETag quotes.
pub fn parts_etag_compare(expected: &[CompletedPart], actual: &[Part]) -> FixtureResult<()> {
    ensure_eq("part count", expected.len(), actual.len())?;
    for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
        ensure_eq(
            &format!("part[{i}] number"),
            e.part_number(),
            a.part_number(),
        )?;
        ensure_eq(
            &format!("part[{i}] etag"),
            e.e_tag().map(unquote),
            a.e_tag().map(unquote),
        )?;
    }
    Ok(())
}

fn unquote(etag: &str) -> String {
    etag.replace('"', "")
}

/// Compare version listings: version id, ETag, key and size.
pub fn version_ids_compare(expected: &[ObjectVersion], actual: &[ObjectVersion]) -> FixtureResult<()> {
    ensure_eq("version count", expected.len(), actual.len())?;
    for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
        ensure_eq(&format!("version[{i}] id"), e.version_id(), a.version_id())?;
        ensure_eq(&format!("version[{i}] etag"), e.e_tag(), a.e_tag())?;
        ensure_eq(&format!("version[{i}] key"), e.key(), a.key())?;
        ensure_eq(&format!("version[{i}] size"), e.size(), a.size())?;
    }
    Ok(())
}

/// The checksum a response reports for `algorithm` must match `content`.
pub fn checksum_compare(
    algorithm: ChecksumAlgorithm,
    content: &[u8],
    response: &ResponseChecksums,
) -> FixtureResult<()> {
    let expected = compute_checksum(algorithm, content);
    ensure_eq(
        &format!("{algorithm} checksum"),
        Some(expected.as_str()),
        response.get(algorithm),
    )
}
