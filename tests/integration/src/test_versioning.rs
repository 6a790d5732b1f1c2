//! Bucket versioning tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::types::BucketVersioningStatus;
    use s3tests_core::constants::NULL_VERSION;
    use s3tests_fixture::versioning::{
        VersionLedger, check_configure_versioning_retry, check_obj_content, check_obj_versions,
        clear_versioned_bucket_concurrent, create_multiple_versions,
        create_versioned_obj_concurrent, delete_suspended_versioning_obj,
        do_test_create_remove_versions, join_tasks, overwrite_suspended_versioning_obj,
        remove_obj_version,
    };

    use crate::context;

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_toggle_versioning_status() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");

        let resp = client.get_bucket_versioning().bucket(&bucket).send().await.expect("get");
        assert_eq!(resp.status(), None);

        check_configure_versioning_retry(&client, &bucket, BucketVersioningStatus::Enabled)
            .await
            .expect("enable");
        check_configure_versioning_retry(&client, &bucket, BucketVersioningStatus::Suspended)
            .await
            .expect("suspend");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_remove_versions_from_newest() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        check_configure_versioning_retry(&client, &bucket, BucketVersioningStatus::Enabled)
            .await
            .expect("enable");

        do_test_create_remove_versions(&client, &bucket, "testobj", 5, 4, -1)
            .await
            .expect("remove newest first");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_remove_versions_from_oldest() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        check_configure_versioning_retry(&client, &bucket, BucketVersioningStatus::Enabled)
            .await
            .expect("enable");

        do_test_create_remove_versions(&client, &bucket, "testobj", 5, 0, 0)
            .await
            .expect("remove oldest first");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_read_every_version() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        check_configure_versioning_retry(&client, &bucket, BucketVersioningStatus::Enabled)
            .await
            .expect("enable");

        let mut ledger = create_multiple_versions(&client, &bucket, "testobj", 3, true)
            .await
            .expect("versions");
        assert_eq!(ledger.len(), 3);
        remove_obj_version(&client, &bucket, "testobj", &mut ledger, 1)
            .await
            .expect("remove middle version");
        check_obj_versions(&client, &bucket, "testobj", &ledger)
            .await
            .expect("remaining versions");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_replace_null_version_while_suspended() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        let key = "testobj";
        check_configure_versioning_retry(&client, &bucket, BucketVersioningStatus::Enabled)
            .await
            .expect("enable");

        let mut ledger = create_multiple_versions(&client, &bucket, key, 3, true)
            .await
            .expect("versions");
        check_configure_versioning_retry(&client, &bucket, BucketVersioningStatus::Suspended)
            .await
            .expect("suspend");

        overwrite_suspended_versioning_obj(&client, &bucket, key, &mut ledger, "null content 1")
            .await
            .expect("first overwrite");
        overwrite_suspended_versioning_obj(&client, &bucket, key, &mut ledger, "null content 2")
            .await
            .expect("second overwrite");
        check_obj_content(&client, &bucket, key, Some(NULL_VERSION), "null content 2")
            .await
            .expect("null version holds the latest write");
        assert_eq!(ledger.len(), 4);

        delete_suspended_versioning_obj(&client, &bucket, key, &mut ledger)
            .await
            .expect("delete null version");
        assert_eq!(ledger.len(), 3);
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_write_and_clear_versions_concurrently() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        check_configure_versioning_retry(&client, &bucket, BucketVersioningStatus::Enabled)
            .await
            .expect("enable");

        join_tasks(create_versioned_obj_concurrent(&client, &bucket, "myobj", 5))
            .await
            .expect("concurrent writes");
        let listed = client.list_object_versions().bucket(&bucket).send().await.expect("list");
        assert_eq!(listed.versions().len(), 5);

        let handles = clear_versioned_bucket_concurrent(&client, &bucket)
            .await
            .expect("spawn deletes");
        join_tasks(handles).await.expect("concurrent deletes");
        let listed = client.list_object_versions().bucket(&bucket).send().await.expect("list");
        assert!(listed.versions().is_empty());
        ctx.teardown().await;
    }

    #[test]
    fn test_should_start_with_empty_ledger() {
        assert!(VersionLedger::default().is_empty());
    }
}
