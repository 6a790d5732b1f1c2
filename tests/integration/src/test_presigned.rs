//! Presigned URL and hand-signed PUT tests.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use s3tests_auth::DEFAULT_CHUNK_SIZE;
    use s3tests_core::constants::sizes::KB;
    use s3tests_fixture::bucket::{create_objects_in, get_body};
    use s3tests_fixture::data::random_text;
    use s3tests_fixture::http::{error_check, presigned_get_url, presigned_put_url};

    use crate::context;

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_read_through_sdk_presigned_url() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        create_objects_in(&client, &bucket, &["foo"]).await.expect("put");
        let http = ctx.raw_http().expect("raw http");

        let url = presigned_get_url(&client, &bucket, "foo", Duration::from_secs(100_000))
            .await
            .expect("presign");
        let response = http.get_object_by_url(&url).await.expect("get by url");
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.text().expect("text"), "foo");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_write_through_sdk_presigned_url() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        let http = ctx.raw_http().expect("raw http");

        let url = presigned_put_url(&client, &bucket, "foo", Duration::from_secs(100_000))
            .await
            .expect("presign");
        let response = http.put_object_by_url(&url, "foo").await.expect("put by url");
        assert_eq!(response.status_code(), 200);
        assert_eq!(get_body(&client, &bucket, "foo").await.expect("get"), "foo");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_plain_url_of_private_object() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        create_objects_in(&client, &bucket, &["foo"]).await.expect("put");
        let http = ctx.raw_http().expect("raw http");

        let response = http
            .get_object_by_url(&http.object_url(&bucket, "foo"))
            .await
            .expect("get by url");
        error_check(response.status_code()).expect("unsigned read rejected");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_read_through_hand_presigned_urls() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        create_objects_in(&client, &bucket, &["foo"]).await.expect("put");
        let http = ctx.raw_http().expect("raw http");

        let v4 = http.presign_v4_url("GET", &bucket, "foo", Duration::from_secs(300), Utc::now());
        let response = http.get_object_by_url(&v4).await.expect("v4 get");
        assert_eq!(response.status_code(), 200);

        let v2 = http.presign_v2_url("GET", &bucket, "foo", Utc::now().timestamp() + 300);
        let response = http.get_object_by_url(&v2).await.expect("v2 get");
        assert_eq!(response.status_code(), 200);
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_expired_presigned_url() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        create_objects_in(&client, &bucket, &["foo"]).await.expect("put");
        let http = ctx.raw_http().expect("raw http");

        let url = http.presign_v2_url("GET", &bucket, "foo", Utc::now().timestamp() - 100);
        let response = http.get_object_by_url(&url).await.expect("get");
        error_check(response.status_code()).expect("expired");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_header_signed_put() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        let http = ctx.raw_http().expect("raw http");
        let body = random_text(KB);

        let response = http
            .put_object_signed(&bucket, "signed", body.as_bytes())
            .await
            .expect("signed put");
        assert_eq!(response.status_code(), 200);
        assert_eq!(get_body(&client, &bucket, "signed").await.expect("get"), body);
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_chunked_put() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        let http = ctx.raw_http().expect("raw http");
        let body = random_text(DEFAULT_CHUNK_SIZE * 2 + 100);

        let response = http
            .put_object_chunked(&bucket, "chunked", body.as_bytes(), DEFAULT_CHUNK_SIZE)
            .await
            .expect("chunked put");
        assert_eq!(response.status_code(), 200);
        assert_eq!(get_body(&client, &bucket, "chunked").await.expect("get"), body);
        ctx.teardown().await;
    }
}
