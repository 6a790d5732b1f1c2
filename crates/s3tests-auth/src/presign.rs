//! Query-string presigning.
//!
//! V4 URLs carry `X-Amz-Algorithm`, `X-Amz-Credential`, `X-Amz-Date`,
//! `X-Amz-Expires`, `X-Amz-SignedHeaders` and `X-Amz-Signature`; only `host`
//! is signed and the payload is `UNSIGNED-PAYLOAD`. V2 URLs carry
//! `AWSAccessKeyId`, `Expires` and `Signature`.

use crate::canonical::{build_canonical_request, canonical_query_string, uri_encode};
use crate::credentials::SigningCredentials;
use crate::sigv2;
use crate::sigv4::{
    ALGORITHM, SigningParams, UNSIGNED_PAYLOAD, build_string_to_sign, compute_signature,
    hash_payload,
};

/// Produce the query string of a SigV4 presigned URL.
///
/// `extra` holds additional unencoded query parameters (e.g. `versionId`)
/// that become part of the signature.
#[must_use]
pub fn presign_v4(
    method: &str,
    host: &str,
    path: &str,
    params: &SigningParams<'_>,
    expires_secs: u64,
    extra: &[(&str, &str)],
) -> String {
    let credential = params.credential();
    let amz_date = params.amz_date();
    let expires = expires_secs.to_string();

    let mut pairs: Vec<(&str, &str)> = vec![
        ("X-Amz-Algorithm", ALGORITHM),
        ("X-Amz-Credential", credential.as_str()),
        ("X-Amz-Date", amz_date.as_str()),
        ("X-Amz-Expires", expires.as_str()),
        ("X-Amz-SignedHeaders", "host"),
    ];
    pairs.extend_from_slice(extra);
    let query = canonical_query_string(&pairs);

    let headers = vec![("host".to_owned(), host.to_owned())];
    let canonical = build_canonical_request(method, path, &query, &headers, UNSIGNED_PAYLOAD);
    let string_to_sign =
        build_string_to_sign(&amz_date, &params.scope(), &hash_payload(canonical.as_bytes()));
    let signature = compute_signature(&params.signing_key(), &string_to_sign);

    format!("{query}&X-Amz-Signature={signature}")
}

/// Produce the query string of a SigV2 presigned URL.
///
/// `resource` is the path-style `/bucket/key`; `expires_at` is epoch seconds.
#[must_use]
pub fn presign_v2(
    method: &str,
    resource: &str,
    credentials: &SigningCredentials,
    expires_at: i64,
) -> String {
    let string_to_sign =
        sigv2::string_to_sign(method, "", "", &expires_at.to_string(), &[], resource);
    let signature = sigv2::sign_v2(&credentials.secret_key, &string_to_sign);
    format!(
        "AWSAccessKeyId={}&Expires={expires_at}&Signature={}",
        uri_encode(&credentials.access_key),
        uri_encode(&signature)
    )
}
