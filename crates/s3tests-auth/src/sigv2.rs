//! Legacy AWS Signature Version 2.
//!
//! `Signature = Base64(HMAC-SHA1(SecretKey, StringToSign))` with
//!
//! ```text
//! StringToSign = HTTP-Verb + "\n" +
//!                Content-MD5 + "\n" +
//!                Content-Type + "\n" +
//!                Date + "\n" +
//!                CanonicalizedAmzHeaders +
//!                CanonicalizedResource
//! ```
//!
//! For query presigning, `Date` is replaced by the `Expires` epoch seconds.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Build the V2 string to sign.
///
/// `amz_headers` may contain any headers; only `x-amz-*` ones are included,
/// lowercased, sorted, with repeated names comma-joined.
#[must_use]
pub fn string_to_sign(
    method: &str,
    content_md5: &str,
    content_type: &str,
    date: &str,
    amz_headers: &[(&str, &str)],
    resource: &str,
) -> String {
    let mut canonical: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in amz_headers {
        let name = name.to_ascii_lowercase();
        if name.starts_with("x-amz-") {
            canonical
                .entry(name)
                .or_default()
                .push(value.trim().to_owned());
        }
    }
    let amz: String = canonical
        .iter()
        .map(|(name, values)| format!("{name}:{}\n", values.join(",")))
        .collect();
    format!("{method}\n{content_md5}\n{content_type}\n{date}\n{amz}{resource}")
}

/// Base64 HMAC-SHA1 of `string_to_sign` under `secret_key`.
///
/// # Examples
///
/// ```
/// use s3tests_auth::sign_v2;
///
/// let sig = sign_v2("secret", "GET\n\n\n1700000000\n/bucket/key");
/// assert_eq!(sig.len(), 28);
/// ```
#[must_use]
pub fn sign_v2(secret_key: &str, string_to_sign: &str) -> String {
    let mut mac = <HmacSha1 as KeyInit>::new_from_slice(secret_key.as_bytes())
        .expect("HMAC can accept any key length");
    mac.update(string_to_sign.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// `AWS <access_key>:<signature>`.
#[must_use]
pub fn authorization_header(access_key: &str, signature: &str) -> String {
    format!("AWS {access_key}:{signature}")
}
