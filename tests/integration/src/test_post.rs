//! Browser-based POST upload tests.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use s3tests_auth::PostPolicy;
    use s3tests_fixture::bucket::get_body;
    use s3tests_fixture::http::{FILE_FIELD, error_check};
    use s3tests_fixture::time::{time_to_add_minutes, time_to_add_seconds};
    use s3tests_fixture::{RawResponse, TestContext};

    use crate::context;

    fn upload_policy(bucket: &str, expiration: PostPolicy) -> PostPolicy {
        expiration
            .field_equals("bucket", bucket)
            .starts_with("key", "foo")
            .field_equals("acl", "private")
            .starts_with("Content-Type", "text/plain")
            .content_length_range(0, 1024)
    }

    async fn post(ctx: &TestContext, bucket: &str, policy: PostPolicy, key: &str) -> RawResponse {
        let http = ctx.raw_http().expect("raw http");
        let signed = http.post_form_v4(policy, Utc::now()).expect("sign policy");
        let mut fields: Vec<(&str, &str)> = vec![
            ("key", key),
            ("acl", "private"),
            ("Content-Type", "text/plain"),
            (FILE_FIELD, "bar"),
        ];
        fields.extend(signed.iter().map(|(n, v)| (n.as_str(), v.as_str())));
        http.post_object(bucket, &fields).await.expect("post")
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_upload_with_signed_policy() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        let policy = upload_policy(&bucket, PostPolicy::expiring_at(time_to_add_seconds(100)));

        let response = post(&ctx, &bucket, policy, "foo.txt").await;
        assert_eq!(response.status_code(), 204);
        assert_eq!(get_body(&client, &bucket, "foo.txt").await.expect("get"), "bar");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_expired_policy() {
        let ctx = context();
        let bucket = ctx.create_bucket().await.expect("create");
        let policy = upload_policy(&bucket, PostPolicy::with_expiration(time_to_add_minutes(-10)));

        let response = post(&ctx, &bucket, policy, "foo.txt").await;
        error_check(response.status_code()).expect("expired policy");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_key_outside_policy_prefix() {
        let ctx = context();
        let bucket = ctx.create_bucket().await.expect("create");
        let policy = upload_policy(&bucket, PostPolicy::expiring_at(time_to_add_seconds(100)));

        let response = post(&ctx, &bucket, policy, "bar.txt").await;
        error_check(response.status_code()).expect("key condition");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_policy_without_expiration() {
        let ctx = context();
        let bucket = ctx.create_bucket().await.expect("create");
        let policy = upload_policy(&bucket, PostPolicy::without_expiration());

        let response = post(&ctx, &bucket, policy, "foo.txt").await;
        error_check(response.status_code()).expect("missing expiration");
        ctx.teardown().await;
    }
}
