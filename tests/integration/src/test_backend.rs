//! Backend replication replay tests (vendor extension).

#[cfg(test)]
mod tests {
    use aws_sdk_s3::types::BucketVersioningStatus;
    use s3tests_core::constants::sizes::MB;
    use s3tests_fixture::backend::{
        backend_delete_object, backend_multipart_upload, backend_put_object,
        backend_put_object_tagging,
    };
    use s3tests_fixture::bucket::{get_version_body, put_random_content};
    use s3tests_fixture::compare::tag_compare;
    use s3tests_fixture::multipart::multipart_upload;
    use s3tests_fixture::tags::{make_simple_tag_set, tagging};
    use s3tests_fixture::versioning::check_configure_versioning_retry;
    use s3tests_fixture::{MultipartOptions, TestContext};

    use crate::context;

    async fn versioned_pair(ctx: &TestContext) -> (String, String) {
        let client = ctx.backend_client();
        let source = ctx.create_bucket_with(&client).await.expect("source");
        let target = ctx.create_bucket_with(&client).await.expect("target");
        for bucket in [&source, &target] {
            check_configure_versioning_retry(&client, bucket, BucketVersioningStatus::Enabled)
                .await
                .expect("enable versioning");
        }
        (source, target)
    }

    async fn latest_version(client: &aws_sdk_s3::Client, bucket: &str, key: &str) -> String {
        let head = client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .expect("head");
        head.version_id().expect("version id").to_owned()
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_replay_object_under_same_version() {
        let ctx = context();
        let client = ctx.backend_client();
        let (source, target) = versioned_pair(&ctx).await;
        let data = put_random_content(&client, &source, "obj", Some(1024))
            .await
            .expect("put");
        let version_id = latest_version(&client, &source, "obj").await;

        backend_put_object(&client, &source, "obj", &target, "obj", &version_id)
            .await
            .expect("replay");
        let body = get_version_body(&client, &target, "obj", Some(&version_id))
            .await
            .expect("read replayed version");
        assert_eq!(body, data);
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_replay_multipart_object() {
        let ctx = context();
        let client = ctx.backend_client();
        let (source, target) = versioned_pair(&ctx).await;
        let upload = multipart_upload(&client, &source, "mp", 11 * MB, &MultipartOptions::default())
            .await
            .expect("upload");
        let version_id = latest_version(&client, &source, "mp").await;

        backend_multipart_upload(&client, &source, "mp", &target, "mp", &version_id)
            .await
            .expect("replay multipart");
        let body = get_version_body(&client, &target, "mp", Some(&version_id))
            .await
            .expect("read replayed version");
        assert_eq!(body, upload.body());
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_replay_tags_and_delete_marker() {
        let ctx = context();
        let client = ctx.backend_client();
        let (source, target) = versioned_pair(&ctx).await;
        put_random_content(&client, &source, "obj", Some(64)).await.expect("put");
        let version_id = latest_version(&client, &source, "obj").await;
        let tags = make_simple_tag_set(3).expect("tags");
        client
            .put_object_tagging()
            .bucket(&source)
            .key("obj")
            .version_id(&version_id)
            .tagging(tagging(tags.clone()).expect("tagging"))
            .send()
            .await
            .expect("put tagging");

        backend_put_object(&client, &source, "obj", &target, "obj", &version_id)
            .await
            .expect("replay object");
        backend_put_object_tagging(&client, &source, "obj", &target, "obj", &version_id)
            .await
            .expect("replay tagging");
        let resp = client
            .get_object_tagging()
            .bucket(&target)
            .key("obj")
            .version_id(&version_id)
            .send()
            .await
            .expect("get tagging");
        tag_compare(&tags, resp.tag_set()).expect("same tags");

        backend_delete_object(&client, &target, "obj", "marker-version-1")
            .await
            .expect("delete marker");
        let listed = client
            .list_object_versions()
            .bucket(&target)
            .send()
            .await
            .expect("list versions");
        assert!(
            listed
                .delete_markers()
                .iter()
                .any(|m| m.version_id() == Some("marker-version-1")),
            "delete marker should carry the requested version id"
        );
        ctx.teardown().await;
    }
}
