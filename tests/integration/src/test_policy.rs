//! Bucket policy tests.

#[cfg(test)]
mod tests {
    use s3tests_core::constants::{codes, policy};
    use s3tests_fixture::assertions::{check_get_object_denied, succeed_get_object};
    use s3tests_fixture::bucket::{create_objects_in, disable_public_access_block};
    use s3tests_fixture::policy::{
        any_principal, make_arn_resource, make_json_policy, make_json_statement, make_policy_string,
    };
    use s3tests_fixture::{SdkResultExt, ensure_error};
    use serde_json::json;

    use crate::context;

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_grant_public_list_through_policy() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        create_objects_in(&client, &bucket, &["asdf"]).await.expect("put");
        disable_public_access_block(&client, &bucket).await.expect("public access");

        let document = make_policy_string(
            "s3:ListBucket",
            &make_arn_resource(&bucket),
            None,
            None,
            None,
        )
        .expect("policy");
        client
            .put_bucket_policy()
            .bucket(&bucket)
            .policy(document)
            .send()
            .await
            .expect("put policy");

        let public = ctx.public_client().await;
        let resp = public.list_objects().bucket(&bucket).send().await.expect("anonymous list");
        assert_eq!(resp.contents().len(), 1);
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_deny_object_read_through_policy() {
        let ctx = context();
        let client = ctx.client();
        let alt = ctx.alt_client();
        let bucket = ctx.create_bucket().await.expect("create");
        create_objects_in(&client, &bucket, &["public", "private"]).await.expect("put");
        disable_public_access_block(&client, &bucket).await.expect("public access");

        let document = make_json_policy([
            make_json_statement(
                "s3:GetObject",
                &make_arn_resource(&format!("{bucket}/*")),
                None,
                Some(any_principal()),
                None,
            ),
            make_json_statement(
                "s3:GetObject",
                &make_arn_resource(&format!("{bucket}/private")),
                Some(policy::DENY),
                Some(any_principal()),
                None,
            ),
        ]);
        client
            .put_bucket_policy()
            .bucket(&bucket)
            .policy(document.to_string())
            .send()
            .await
            .expect("put policy");

        succeed_get_object(&alt, &bucket, "public", "public")
            .await
            .expect("allowed read");
        check_get_object_denied(&alt, &bucket, "private")
            .await
            .expect("denied read");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_honour_policy_conditions() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        create_objects_in(&client, &bucket, &["foo"]).await.expect("put");
        disable_public_access_block(&client, &bucket).await.expect("public access");

        let condition = json!({ "StringEquals": { "s3:prefix": "foo" } });
        let document = make_policy_string(
            "s3:ListBucket",
            &make_arn_resource(&bucket),
            None,
            Some(any_principal()),
            Some(condition),
        )
        .expect("policy");
        client
            .put_bucket_policy()
            .bucket(&bucket)
            .policy(document)
            .send()
            .await
            .expect("put policy");

        let alt = ctx.alt_client();
        alt.list_objects()
            .bucket(&bucket)
            .prefix("foo")
            .send()
            .await
            .expect("matching prefix");
        let result = alt
            .list_objects()
            .bucket(&bucket)
            .prefix("bar")
            .send()
            .await
            .op("ListObjects");
        ensure_error("ListObjects", result, 403, Some(codes::ACCESS_DENIED))
            .expect("other prefix denied");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_malformed_policy() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");

        let result = client
            .put_bucket_policy()
            .bucket(&bucket)
            .policy("{\"Version\": \"2012-10-17\"")
            .send()
            .await
            .op("PutBucketPolicy");
        ensure_error("PutBucketPolicy", result, 400, Some(codes::MALFORMED_POLICY))
            .expect("malformed");
        ctx.teardown().await;
    }
}
