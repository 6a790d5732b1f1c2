//! Server-side encryption tests.

#[cfg(test)]
mod tests {
    use s3tests_core::constants::sizes::{KB, MB};
    use s3tests_fixture::sse::{CopyEncryption, EncryptionType};

    use crate::context;

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_customer_key_objects() {
        let ctx = context();
        for size in [1, KB, MB] {
            ctx.verify_sse_c_write(size)
                .await
                .unwrap_or_else(|e| panic!("SSE-C {size} bytes: {e}"));
        }
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_sse_s3_objects() {
        let ctx = context();
        for size in [1, KB, MB] {
            ctx.verify_sse_s3_write(size)
                .await
                .unwrap_or_else(|e| panic!("SSE-S3 {size} bytes: {e}"));
        }
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_apply_bucket_default_encryption_to_copies() {
        let ctx = context();
        ctx.verify_sse_s3_copy(KB).await.expect("default encryption copy");
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_between_encrypted_buckets() {
        let ctx = context();
        let cases = [
            CopyEncryption::default(),
            CopyEncryption {
                source_object: true,
                ..CopyEncryption::default()
            },
            CopyEncryption {
                source_bucket: true,
                ..CopyEncryption::default()
            },
            CopyEncryption {
                target_bucket: true,
                ..CopyEncryption::default()
            },
            CopyEncryption {
                target_object: true,
                ..CopyEncryption::default()
            },
            CopyEncryption {
                source_object: true,
                source_bucket: true,
                target_bucket: true,
                target_object: true,
            },
        ];
        for encryption in cases {
            ctx.verify_object_copy_between_buckets(encryption, KB)
                .await
                .unwrap_or_else(|e| panic!("{encryption:?}: {e}"));
        }
        ctx.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_copy_across_encryption_types() {
        let ctx = context();
        let types = [EncryptionType::Normal, EncryptionType::SseS3, EncryptionType::SseC];
        for source in types {
            for target in types {
                ctx.verify_object_copy(source, target, KB)
                    .await
                    .unwrap_or_else(|e| panic!("{source:?} -> {target:?}: {e}"));
            }
        }
        ctx.teardown().await;
    }
}
