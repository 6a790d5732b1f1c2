//! Paged listing tests for `ListObjects` and `ListObjectsV2`.

#[cfg(test)]
mod tests {
    use s3tests_fixture::ListExpectation;
    use s3tests_fixture::listing::{validate_list_object, validate_list_object_v2};

    use crate::context;

    const KEYS: [&str; 5] = ["asdf", "boo/bar", "boo/baz/xyzzy", "cquux/thud", "cquux/bla"];

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_page_v1_listing_with_delimiter() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_objects(&KEYS).await.expect("create objects");

        let first = ListExpectation::builder()
            .delimiter("/")
            .max_keys(1)
            .is_truncated(true)
            .keys(&["asdf"])
            .build();
        let marker = validate_list_object(&client, &bucket, &first, Some("asdf"))
            .await
            .expect("page 1");

        let second = ListExpectation::builder()
            .delimiter("/")
            .start(marker)
            .max_keys(1)
            .is_truncated(true)
            .prefixes(&["boo/"])
            .build();
        let marker = validate_list_object(&client, &bucket, &second, Some("boo/"))
            .await
            .expect("page 2");

        let third = ListExpectation::builder()
            .delimiter("/")
            .start(marker)
            .max_keys(1)
            .prefixes(&["cquux/"])
            .build();
        validate_list_object(&client, &bucket, &third, None)
            .await
            .expect("page 3");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_page_v2_listing_with_delimiter() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_objects(&KEYS).await.expect("create objects");

        let first = ListExpectation::builder()
            .delimiter("/")
            .max_keys(1)
            .is_truncated(true)
            .keys(&["asdf"])
            .build();
        let token = validate_list_object_v2(&client, &bucket, &first, false)
            .await
            .expect("page 1");

        let second = ListExpectation::builder()
            .delimiter("/")
            .start(token)
            .max_keys(1)
            .is_truncated(true)
            .prefixes(&["boo/"])
            .build();
        let token = validate_list_object_v2(&client, &bucket, &second, false)
            .await
            .expect("page 2");

        let third = ListExpectation::builder()
            .delimiter("/")
            .start(token)
            .max_keys(1)
            .prefixes(&["cquux/"])
            .build();
        validate_list_object_v2(&client, &bucket, &third, true)
            .await
            .expect("page 3");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_under_prefix() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_objects(&KEYS).await.expect("create objects");

        let expect = ListExpectation::builder()
            .prefix("boo/")
            .delimiter("/")
            .keys(&["boo/bar"])
            .prefixes(&["boo/baz/"])
            .build();
        validate_list_object(&client, &bucket, &expect, None)
            .await
            .expect("v1");
        validate_list_object_v2(&client, &bucket, &expect, true)
            .await
            .expect("v2");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_everything_without_delimiter() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_objects(&KEYS).await.expect("create objects");

        let mut sorted = KEYS.to_vec();
        sorted.sort_unstable();
        let expect = ListExpectation::builder().keys(&sorted).build();
        validate_list_object_v2(&client, &bucket, &expect, true)
            .await
            .expect("all keys");
        ctx.teardown().await;
    }
}
