//! Bucket creation, naming and deletion tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::types::{BucketCannedAcl, ObjectOwnership};
    use s3tests_core::constants::codes;
    use s3tests_fixture::bucket::create_objects_in;
    use s3tests_fixture::{SdkResultExt, ensure_error};

    use crate::context;

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_list_and_delete_bucket() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create bucket");

        let resp = client.list_buckets().send().await.expect("list_buckets");
        let names: Vec<&str> = resp.buckets().iter().filter_map(|b| b.name()).collect();
        assert!(names.contains(&bucket.as_str()), "should contain {bucket}");

        client
            .delete_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect("delete bucket");
        ctx.forget_bucket(&bucket);

        let head = client.head_bucket().bucket(&bucket).send().await.op("HeadBucket");
        ensure_error("HeadBucket", head, 404, None).expect("bucket should be gone");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_delete_nonempty_bucket() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_objects(&["foo"]).await.expect("create objects");

        let result = client.delete_bucket().bucket(&bucket).send().await.op("DeleteBucket");
        ensure_error("DeleteBucket", result, 409, Some(codes::BUCKET_NOT_EMPTY))
            .expect("non-empty bucket must not be deleted");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_recreate_owned_bucket() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create bucket");

        let result = client.create_bucket().bucket(&bucket).send().await.op("CreateBucket");
        let err = result.expect_err("duplicate bucket should fail");
        assert_eq!(err.status(), Some(409));
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_bad_bucket_names() {
        let ctx = context();
        for name in ["", "a", "ab", "Aaa", "-abc", "abc-", "a..b", "192.168.5.4", "abc_def"] {
            ctx.check_bad_bucket_name(name)
                .await
                .unwrap_or_else(|e| panic!("{name:?} should be rejected: {e}"));
        }
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_long_bucket_names() {
        let ctx = context();
        for len in [60, 61, 62, 63] {
            ctx.bucket_create_naming_good_long(len)
                .await
                .unwrap_or_else(|e| panic!("length {len} should be accepted: {e}"));
        }
        ctx.bucket_create_naming_bad_long(64)
            .await
            .expect("64 characters should be rejected");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_dotted_and_dashed_names() {
        let ctx = context();
        ctx.check_good_bucket_name("aaa.111", None)
            .await
            .expect("dotted name");
        ctx.check_good_bucket_name("aaa-111", None)
            .await
            .expect("dashed name");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_create_bucket_with_public_read_acl() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx
            .create_bucket_with_acl(
                &client,
                ObjectOwnership::BucketOwnerPreferred,
                Some(BucketCannedAcl::PublicRead),
            )
            .await
            .expect("create bucket");
        create_objects_in(&client, &bucket, &["foo"])
            .await
            .expect("put object");

        let public = ctx.public_client().await;
        let resp = public
            .list_objects()
            .bucket(&bucket)
            .send()
            .await
            .expect("anonymous list");
        assert_eq!(resp.contents().len(), 1);
        ctx.teardown().await;
    }
}
