//! ACL builders and permission setups.

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    AccessControlPolicy, BucketCannedAcl, Grant, Grantee, ObjectCannedAcl, ObjectOwnership, Owner,
    Permission, Type,
};
use s3tests_core::UserData;
use s3tests_core::constants::groups;

use crate::context::TestContext;
use crate::error::{FixtureResult, SdkResultExt};

/// Key written by the single-object permission setups.
pub const ACL_KEY: &str = "foo";

/// Keys written by the two-object permission setups.
pub const ACL_KEYS: [&str; 2] = ["foo", "bar"];

/// Owner element for `user`.
#[must_use]
pub fn owner(user: &UserData) -> Owner {
    Owner::builder()
        .id(&user.user_id)
        .display_name(&user.display_name)
        .build()
}

/// Canonical-user grantee for `user`.
pub fn user_grantee(user: &UserData) -> FixtureResult<Grantee> {
    Ok(Grantee::builder()
        .r#type(Type::CanonicalUser)
        .id(&user.user_id)
        .display_name(&user.display_name)
        .build()?)
}

/// The `AllUsers` group.
pub fn public_grantee() -> FixtureResult<Grantee> {
    group_grantee(groups::ALL_USERS)
}

/// The `AuthenticatedUsers` group.
pub fn authenticated_grantee() -> FixtureResult<Grantee> {
    group_grantee(groups::AUTHENTICATED_USERS)
}

fn group_grantee(uri: &str) -> FixtureResult<Grantee> {
    Ok(Grantee::builder().r#type(Type::Group).uri(uri).build()?)
}

/// A single grant.
#[must_use]
pub fn grant(grantee: Grantee, permission: Permission) -> Grant {
    Grant::builder()
        .grantee(grantee)
        .permission(permission)
        .build()
}

/// Grant `permission` to the owner itself.
pub fn owner_grant(owner: &Owner, permission: Permission) -> FixtureResult<Grant> {
    let grantee = Grantee::builder()
        .r#type(Type::CanonicalUser)
        .set_id(owner.id().map(str::to_owned))
        .set_display_name(owner.display_name().map(str::to_owned))
        .build()?;
    Ok(grant(grantee, permission))
}

/// Owner `FULL_CONTROL` plus one grant to `grantee` per permission.
pub fn create_acl(
    owner: &Owner,
    grantee: &Grantee,
    permissions: &[Permission],
) -> FixtureResult<AccessControlPolicy> {
    let mut grants = vec![owner_grant(owner, Permission::FullControl)?];
    grants.extend(
        permissions
            .iter()
            .map(|permission| grant(grantee.clone(), permission.clone())),
    );
    Ok(AccessControlPolicy::builder()
        .owner(owner.clone())
        .set_grants(Some(grants))
        .build())
}

impl TestContext {
    /// Owner element of the main user.
    #[must_use]
    pub fn main_owner(&self) -> Owner {
        owner(&self.config().main_user)
    }

    /// Owner element of the alt user.
    #[must_use]
    pub fn alt_owner(&self) -> Owner {
        owner(&self.config().alt_user)
    }

    /// ACL of a freshly created main-user resource: owner `FULL_CONTROL` only.
    pub fn create_default_acl(&self) -> FixtureResult<AccessControlPolicy> {
        create_acl(
            &self.main_owner(),
            &user_grantee(&self.config().main_user)?,
            &[],
        )
    }

    /// Main owner granting `permissions` to everyone.
    pub fn create_public_acl(&self, permissions: &[Permission]) -> FixtureResult<AccessControlPolicy> {
        create_acl(&self.main_owner(), &public_grantee()?, permissions)
    }

    /// Main owner granting `permissions` to any authenticated user.
    pub fn create_authenticated_acl(
        &self,
        permissions: &[Permission],
    ) -> FixtureResult<AccessControlPolicy> {
        create_acl(&self.main_owner(), &authenticated_grantee()?, permissions)
    }

    /// Main owner granting `permissions` to the alt user.
    pub fn create_alt_acl(&self, permissions: &[Permission]) -> FixtureResult<AccessControlPolicy> {
        create_acl(
            &self.main_owner(),
            &user_grantee(&self.config().alt_user)?,
            permissions,
        )
    }

    /// Append `grant` to the bucket's current ACL and store it.
    pub async fn add_bucket_user_grant(
        &self,
        bucket: &str,
        grant: Grant,
    ) -> FixtureResult<AccessControlPolicy> {
        let client = self.client();
        let current = client
            .get_bucket_acl()
            .bucket(bucket)
            .send()
            .await
            .op("GetBucketAcl")?;
        let mut grants = current.grants().to_vec();
        grants.push(grant);
        let policy = AccessControlPolicy::builder()
            .set_owner(current.owner().cloned())
            .set_grants(Some(grants))
            .build();
        client
            .put_bucket_acl()
            .bucket(bucket)
            .access_control_policy(policy.clone())
            .send()
            .await
            .op("PutBucketAcl")?;
        Ok(policy)
    }

    /// `ObjectWriter` bucket with a canned ACL.
    pub async fn setup_bucket_permission(&self, acl: BucketCannedAcl) -> FixtureResult<String> {
        self.create_bucket_with_acl(&self.client(), ObjectOwnership::ObjectWriter, Some(acl))
            .await
    }

    /// `ObjectWriter` bucket with `bucket_acl` holding `foo` written with `object_acl`.
    pub async fn setup_object_permission(
        &self,
        bucket_acl: Option<BucketCannedAcl>,
        object_acl: ObjectCannedAcl,
    ) -> FixtureResult<(String, String)> {
        let client = self.client();
        let bucket = self
            .create_bucket_with_acl(&client, ObjectOwnership::ObjectWriter, bucket_acl)
            .await?;
        put_with_acl(&client, &bucket, ACL_KEY, object_acl).await?;
        Ok((bucket, ACL_KEY.to_owned()))
    }

    /// Bucket whose ACL grants `permission` to the alt user.
    pub async fn setup_bucket_grant(&self, permission: Permission) -> FixtureResult<String> {
        let client = self.client();
        let bucket = self.create_bucket_canned_acl(&client).await?;
        client
            .put_bucket_acl()
            .bucket(&bucket)
            .access_control_policy(self.create_alt_acl(&[permission])?)
            .send()
            .await
            .op("PutBucketAcl")?;
        Ok(bucket)
    }

    /// Public-read-write bucket holding `key`, whose ACL grants `permission` to the alt user.
    pub async fn setup_object_grant(&self, key: &str, permission: Permission) -> FixtureResult<String> {
        let client = self.client();
        let bucket = self
            .create_bucket_with_acl(
                &client,
                ObjectOwnership::ObjectWriter,
                Some(BucketCannedAcl::PublicReadWrite),
            )
            .await?;
        crate::bucket::create_objects_in(&client, &bucket, &[key]).await?;
        client
            .put_object_acl()
            .bucket(&bucket)
            .key(key)
            .access_control_policy(self.create_alt_acl(&[permission])?)
            .send()
            .await
            .op("PutObjectAcl")?;
        Ok(bucket)
    }

    /// Bucket with a canned ACL holding `foo`.
    pub async fn setup_acl_bucket(&self, acl: Option<BucketCannedAcl>) -> FixtureResult<String> {
        let client = self.client();
        let bucket = self
            .create_bucket_with_acl(&client, ObjectOwnership::ObjectWriter, acl)
            .await?;
        crate::bucket::create_objects_in(&client, &bucket, &[ACL_KEY]).await?;
        Ok(bucket)
    }

    /// Bucket with `bucket_acl` holding `foo` and `bar` written by the main user with `object_acl`.
    pub async fn setup_acl_objects(
        &self,
        bucket_acl: Option<BucketCannedAcl>,
        object_acl: ObjectCannedAcl,
    ) -> FixtureResult<String> {
        let client = self.client();
        self.setup_acl_objects_written_by(&client, bucket_acl, object_acl)
            .await
    }

    /// Same as [`TestContext::setup_acl_objects`] with the objects written by the alt user.
    pub async fn setup_acl_objects_by_alt(
        &self,
        bucket_acl: Option<BucketCannedAcl>,
        object_acl: ObjectCannedAcl,
    ) -> FixtureResult<String> {
        let writer = self.alt_client();
        self.setup_acl_objects_written_by(&writer, bucket_acl, object_acl)
            .await
    }

    async fn setup_acl_objects_written_by(
        &self,
        writer: &Client,
        bucket_acl: Option<BucketCannedAcl>,
        object_acl: ObjectCannedAcl,
    ) -> FixtureResult<String> {
        let bucket = self
            .create_bucket_with_acl(&self.client(), ObjectOwnership::ObjectWriter, bucket_acl)
            .await?;
        for key in ACL_KEYS {
            put_with_acl(writer, &bucket, key, object_acl.clone()).await?;
        }
        Ok(bucket)
    }
}

async fn put_with_acl(
    client: &Client,
    bucket: &str,
    key: &str,
    acl: ObjectCannedAcl,
) -> FixtureResult<()> {
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .acl(acl)
        .body(ByteStream::from(key.as_bytes().to_vec()))
        .send()
        .await
        .op("PutObject")?;
    Ok(())
}
