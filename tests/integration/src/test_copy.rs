//! Object copy tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::types::{BucketVersioningStatus, MetadataDirective};
    use s3tests_core::constants::{codes, sizes::MB};
    use s3tests_fixture::bucket::{copy_source, create_objects_in, put_random_content};
    use s3tests_fixture::content::{
        ReadOptions, check_copy_content, check_copy_content_prefix, check_copy_content_using_range,
    };
    use s3tests_fixture::multipart::multipart_copy;
    use s3tests_fixture::versioning::{check_configure_versioning_retry, create_multiple_versions};
    use s3tests_fixture::{MultipartCopyOptions, SdkResultExt, ensure_error};

    use crate::context;

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_within_and_across_buckets() {
        let ctx = context();
        let client = ctx.client();
        let source = ctx.create_bucket().await.expect("source");
        let target = ctx.create_bucket().await.expect("target");
        put_random_content(&client, &source, "foo123bar", Some(MB))
            .await
            .expect("put");

        for (bucket, key) in [(&source, "bar321foo"), (&target, "bar321foo")] {
            client
                .copy_object()
                .copy_source(copy_source(&source, "foo123bar", None))
                .bucket(bucket.as_str())
                .key(key)
                .send()
                .await
                .expect("copy");
            check_copy_content(
                &client,
                &source,
                "foo123bar",
                bucket,
                key,
                &ReadOptions::default(),
                &ReadOptions::default(),
            )
            .await
            .expect("same content");
        }
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_keys_needing_escapes() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        create_objects_in(&client, &bucket, &["foo bar+baz"]).await.expect("put");

        client
            .copy_object()
            .copy_source(copy_source(&bucket, "foo bar+baz", None))
            .bucket(&bucket)
            .key("copied")
            .send()
            .await
            .expect("copy");
        check_copy_content(
            &client,
            &bucket,
            "foo bar+baz",
            &bucket,
            "copied",
            &ReadOptions::default(),
            &ReadOptions::default(),
        )
        .await
        .expect("same content");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_older_version() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        check_configure_versioning_retry(&client, &bucket, BucketVersioningStatus::Enabled)
            .await
            .expect("enable");
        let ledger = create_multiple_versions(&client, &bucket, "testobj", 3, false)
            .await
            .expect("versions");
        let oldest = &ledger.version_ids[0];

        client
            .copy_object()
            .copy_source(copy_source(&bucket, "testobj", Some(oldest)))
            .bucket(&bucket)
            .key("copied")
            .send()
            .await
            .expect("copy version");
        check_copy_content(
            &client,
            &bucket,
            "testobj",
            &bucket,
            "copied",
            &ReadOptions::builder().version_id(oldest.clone()).build(),
            &ReadOptions::default(),
        )
        .await
        .expect("old version content");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_copy_onto_itself_without_changes() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_objects(&["foo123bar"]).await.expect("create");

        let result = client
            .copy_object()
            .copy_source(copy_source(&bucket, "foo123bar", None))
            .bucket(&bucket)
            .key("foo123bar")
            .send()
            .await
            .op("CopyObject");
        ensure_error("CopyObject", result, 400, Some(codes::INVALID_REQUEST))
            .expect("self copy");

        client
            .copy_object()
            .copy_source(copy_source(&bucket, "foo123bar", None))
            .bucket(&bucket)
            .key("foo123bar")
            .metadata_directive(MetadataDirective::Replace)
            .metadata("foo", "bar")
            .send()
            .await
            .expect("self copy replacing metadata");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_parts_of_large_object() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        let size = 11 * MB;
        put_random_content(&client, &bucket, "source", Some(size))
            .await
            .expect("put");

        let whole = MultipartCopyOptions::builder().complete(true).build();
        multipart_copy(&client, &bucket, "source", &bucket, "whole", size, &whole)
            .await
            .expect("whole copy");
        check_copy_content_using_range(&client, &bucket, "source", &bucket, "whole", MB)
            .await
            .expect("ranges match");

        let leading = MultipartCopyOptions::builder().complete(true).build();
        multipart_copy(&client, &bucket, "source", &bucket, "leading", 6 * MB, &leading)
            .await
            .expect("prefix copy");
        check_copy_content_prefix(&client, &bucket, "source", &bucket, "leading")
            .await
            .expect("leading bytes match");
        ctx.teardown().await;
    }
}
