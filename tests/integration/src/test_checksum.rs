//! Additional checksum and `Content-MD5` tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::types::ChecksumMode;
    use s3tests_core::constants::{codes, sizes::KB};
    use s3tests_fixture::checksums::compute_content_md5;
    use s3tests_fixture::compare::checksum_compare;
    use s3tests_fixture::data::random_text;
    use s3tests_fixture::{ChecksumAlgorithm, ResponseChecksums, SdkResultExt, ensure_error};

    use crate::context;

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_checksum_of_every_algorithm() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        let body = random_text(9 * KB);

        for algorithm in ChecksumAlgorithm::ALL {
            let key = format!("checksum-{algorithm}");
            let put = client
                .put_object()
                .bucket(&bucket)
                .key(&key)
                .checksum_algorithm(algorithm.into())
                .body(ByteStream::from(body.clone().into_bytes()))
                .send()
                .await
                .expect("put");
            checksum_compare(algorithm, body.as_bytes(), &ResponseChecksums::from(&put))
                .unwrap_or_else(|e| panic!("put {algorithm}: {e}"));

            let head = client
                .head_object()
                .bucket(&bucket)
                .key(&key)
                .checksum_mode(ChecksumMode::Enabled)
                .send()
                .await
                .expect("head");
            checksum_compare(algorithm, body.as_bytes(), &ResponseChecksums::from(&head))
                .unwrap_or_else(|e| panic!("head {algorithm}: {e}"));
        }
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_check_content_md5() {
        let ctx = context();
        let client = ctx.client();
        let bucket = ctx.create_bucket().await.expect("create");
        let body = random_text(KB);

        client
            .put_object()
            .bucket(&bucket)
            .key("good")
            .content_md5(compute_content_md5(body.as_bytes()))
            .body(ByteStream::from(body.clone().into_bytes()))
            .send()
            .await
            .expect("matching MD5");

        let result = client
            .put_object()
            .bucket(&bucket)
            .key("bad")
            .content_md5(compute_content_md5(b"something else"))
            .body(ByteStream::from(body.into_bytes()))
            .send()
            .await
            .op("PutObject");
        ensure_error("PutObject", result, 400, Some(codes::BAD_DIGEST)).expect("BadDigest");
        ctx.teardown().await;
    }
}
