//! Object and bucket tagging tests.

#[cfg(test)]
mod tests {
    use s3tests_core::constants::codes;
    use s3tests_fixture::bucket::create_objects_in;
    use s3tests_fixture::compare::tag_compare;
    use s3tests_fixture::tags::{make_detail_tag_set, make_simple_tag_set, tag, tagging};
    use s3tests_fixture::{SdkResultExt, ensure_error};

    use crate::context;

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_ten_object_tags() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_objects(&["testputtags"]).await.expect("create");
        let tags = make_simple_tag_set(10).expect("tags");

        client
            .put_object_tagging()
            .bucket(&bucket)
            .key("testputtags")
            .tagging(tagging(tags.clone()).expect("tagging"))
            .send()
            .await
            .expect("put tagging");
        let resp = client
            .get_object_tagging()
            .bucket(&bucket)
            .key("testputtags")
            .send()
            .await
            .expect("get tagging");
        tag_compare(&tags, resp.tag_set()).expect("same tags in any order");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_eleven_object_tags() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_objects(&["testputtags"]).await.expect("create");

        let result = client
            .put_object_tagging()
            .bucket(&bucket)
            .key("testputtags")
            .tagging(tagging(make_simple_tag_set(11).expect("tags")).expect("tagging"))
            .send()
            .await
            .op("PutObjectTagging");
        ensure_error("PutObjectTagging", result, 400, Some(codes::BAD_REQUEST))
            .expect("too many tags");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_maximum_key_and_value_sizes() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_objects(&["testputmaxkeysize"]).await.expect("create");
        let tags = make_detail_tag_set(10, 128, 256).expect("tags");

        client
            .put_object_tagging()
            .bucket(&bucket)
            .key("testputmaxkeysize")
            .tagging(tagging(tags.clone()).expect("tagging"))
            .send()
            .await
            .expect("put tagging");
        let resp = client
            .get_object_tagging()
            .bucket(&bucket)
            .key("testputmaxkeysize")
            .send()
            .await
            .expect("get tagging");
        tag_compare(&tags, resp.tag_set()).expect("same tags");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_oversized_tag_key() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_objects(&["testputmaxkeysize"]).await.expect("create");

        let result = client
            .put_object_tagging()
            .bucket(&bucket)
            .key("testputmaxkeysize")
            .tagging(tagging(make_detail_tag_set(10, 129, 256).expect("tags")).expect("tagging"))
            .send()
            .await
            .op("PutObjectTagging");
        ensure_error("PutObjectTagging", result, 400, Some(codes::INVALID_TAG))
            .expect("key too long");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_delete_object_tags() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        create_objects_in(&client, &bucket, &["foo"]).await.expect("put");

        client
            .put_object_tagging()
            .bucket(&bucket)
            .key("foo")
            .tagging(tagging(vec![tag("key1", "value1").expect("tag")]).expect("tagging"))
            .send()
            .await
            .expect("put tagging");
        client
            .delete_object_tagging()
            .bucket(&bucket)
            .key("foo")
            .send()
            .await
            .expect("delete tagging");
        let resp = client
            .get_object_tagging()
            .bucket(&bucket)
            .key("foo")
            .send()
            .await
            .expect("get tagging");
        assert!(resp.tag_set().is_empty());
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_bucket_tags() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        let tags = make_simple_tag_set(5).expect("tags");

        client
            .put_bucket_tagging()
            .bucket(&bucket)
            .tagging(tagging(tags.clone()).expect("tagging"))
            .send()
            .await
            .expect("put bucket tagging");
        let resp = client
            .get_bucket_tagging()
            .bucket(&bucket)
            .send()
            .await
            .expect("get bucket tagging");
        tag_compare(&tags, resp.tag_set()).expect("same tags");

        client
            .delete_bucket_tagging()
            .bucket(&bucket)
            .send()
            .await
            .expect("delete bucket tagging");
        let result = client.get_bucket_tagging().bucket(&bucket).send().await.op("GetBucketTagging");
        ensure_error("GetBucketTagging", result, 404, Some(codes::NO_SUCH_TAG_SET))
            .expect("no tag set");
        ctx.teardown().await;
    }
}
