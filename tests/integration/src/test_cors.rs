//! CORS configuration and preflight tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::types::{BucketCannedAcl, CorsConfiguration, CorsRule, ObjectOwnership};
    use reqwest::Method;
    use s3tests_core::constants::codes;
    use s3tests_fixture::{SdkResultExt, TestContext, ensure_error};

    use crate::context;

    async fn cors_bucket(ctx: &TestContext) -> String {
        let client = ctx.client();
        let bucket = ctx
            .create_bucket_with_acl(
                &client,
                ObjectOwnership::BucketOwnerPreferred,
                Some(BucketCannedAcl::PublicRead),
            )
            .await
            .expect("create bucket");
        let configuration = CorsConfiguration::builder()
            .cors_rules(
                CorsRule::builder()
                    .allowed_origins("*suffix")
                    .allowed_methods("GET")
                    .allowed_methods("PUT")
                    .build()
                    .expect("suffix rule"),
            )
            .cors_rules(
                CorsRule::builder()
                    .allowed_origins("start*end")
                    .allowed_methods("GET")
                    .allowed_methods("PUT")
                    .build()
                    .expect("infix rule"),
            )
            .cors_rules(
                CorsRule::builder()
                    .allowed_origins("prefix*")
                    .allowed_methods("GET")
                    .allowed_methods("PUT")
                    .build()
                    .expect("prefix rule"),
            )
            .build()
            .expect("configuration");
        client
            .put_bucket_cors()
            .bucket(&bucket)
            .cors_configuration(configuration)
            .send()
            .await
            .expect("put cors");
        bucket
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_set_read_and_delete_cors() {
        let ctx = context();
        let client = ctx.client();
        let bucket = cors_bucket(&ctx).await;

        let resp = client.get_bucket_cors().bucket(&bucket).send().await.expect("get cors");
        assert_eq!(resp.cors_rules().len(), 3);

        client.delete_bucket_cors().bucket(&bucket).send().await.expect("delete cors");
        let result = client.get_bucket_cors().bucket(&bucket).send().await.op("GetBucketCors");
        ensure_error("GetBucketCors", result, 404, Some(codes::NO_SUCH_CORS_CONFIGURATION))
            .expect("no configuration");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_match_origin_wildcards() {
        let ctx = context();
        let bucket = cors_bucket(&ctx).await;
        let http = ctx.raw_http().expect("raw http");
        let get_put = Some("GET, PUT");

        http.cors_request_and_check(Method::GET, &bucket, None, &[], 200, None, None)
            .await
            .expect("no origin");
        http.cors_request_and_check(
            Method::GET,
            &bucket,
            None,
            &[("Origin", "foo.suffix")],
            200,
            Some("foo.suffix"),
            get_put,
        )
        .await
        .expect("suffix match");
        http.cors_request_and_check(
            Method::GET,
            &bucket,
            None,
            &[("Origin", "foo.bar")],
            200,
            None,
            None,
        )
        .await
        .expect("no match");
        http.cors_request_and_check(
            Method::GET,
            &bucket,
            None,
            &[("Origin", "startend")],
            200,
            Some("startend"),
            get_put,
        )
        .await
        .expect("infix match");
        http.cors_request_and_check(
            Method::GET,
            &bucket,
            None,
            &[("Origin", "prefix.suffix")],
            200,
            Some("prefix.suffix"),
            get_put,
        )
        .await
        .expect("prefix match");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_answer_preflight_requests() {
        let ctx = context();
        let bucket = cors_bucket(&ctx).await;
        let http = ctx.raw_http().expect("raw http");

        http.cors_request_and_check(
            Method::OPTIONS,
            &bucket,
            Some("bar"),
            &[("Origin", "foo.suffix"), ("Access-Control-Request-Method", "GET")],
            200,
            Some("foo.suffix"),
            Some("GET, PUT"),
        )
        .await
        .expect("allowed preflight");
        http.cors_request_and_check(
            Method::OPTIONS,
            &bucket,
            Some("bar"),
            &[("Origin", "foo.bar"), ("Access-Control-Request-Method", "GET")],
            403,
            None,
            None,
        )
        .await
        .expect("rejected preflight");
        ctx.teardown().await;
    }
}
