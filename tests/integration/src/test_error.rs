//! Error response tests: missing resources, bad credentials, denied access.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;
    use s3tests_core::constants::codes;
    use s3tests_fixture::assertions::{
        FORBIDDEN, failed_get_object, failed_list_objects, failed_put_object,
    };
    use s3tests_fixture::client::BAD_ACCESS_KEY;
    use s3tests_fixture::{SdkResultExt, ensure_error};

    use crate::context;

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_no_such_bucket() {
        context()
            .run(|ctx| async move {
                let client = ctx.client();
                let bucket = ctx.new_bucket_name_untracked();

                let result = client
                    .put_object()
                    .bucket(&bucket)
                    .key("foo")
                    .body(ByteStream::from_static(b"bar"))
                    .send()
                    .await
                    .op("PutObject");
                ensure_error("PutObject", result, 404, Some(codes::NO_SUCH_BUCKET)).expect("put");

                let result = client.list_objects().bucket(&bucket).send().await.op("ListObjects");
                ensure_error("ListObjects", result, 404, Some(codes::NO_SUCH_BUCKET)).expect("list");
            })
            .await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unknown_access_key() {
        context()
            .run(|ctx| async move {
                let bucket = ctx.create_objects(&["foo"]).await.expect("create");
                let bad = ctx.bad_auth_client(Some(BAD_ACCESS_KEY), None);

                failed_get_object(&bad, &bucket, "foo", FORBIDDEN, codes::INVALID_ACCESS_KEY_ID)
                    .await
                    .expect("get with unknown key");
                failed_list_objects(&bad, &bucket, FORBIDDEN, codes::INVALID_ACCESS_KEY_ID)
                    .await
                    .expect("list with unknown key");
            })
            .await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_wrong_secret() {
        context()
            .run(|ctx| async move {
                let bucket = ctx.create_objects(&["foo"]).await.expect("create");
                let access_key = ctx.config().main_user.access_key.clone();
                let bad = ctx.bad_auth_client(Some(&access_key), None);

                failed_put_object(&bad, &bucket, "foo", FORBIDDEN, codes::SIGNATURE_DOES_NOT_MATCH)
                    .await
                    .expect("put with wrong secret");
            })
            .await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_deny_alt_user_on_private_bucket() {
        context()
            .run(|ctx| async move {
                let bucket = ctx.create_objects(&["foo"]).await.expect("create");
                let alt = ctx.alt_client();

                failed_get_object(&alt, &bucket, "foo", FORBIDDEN, codes::ACCESS_DENIED)
                    .await
                    .expect("alt get");
                failed_put_object(&alt, &bucket, "bar", FORBIDDEN, codes::ACCESS_DENIED)
                    .await
                    .expect("alt put");
                failed_list_objects(&alt, &bucket, FORBIDDEN, codes::ACCESS_DENIED)
                    .await
                    .expect("alt list");
            })
            .await;
    }
}
