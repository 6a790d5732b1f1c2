//! Canonical request construction for AWS Signature Version 4.
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n\n
//! SignedHeaders\n
//! HashedPayload
//! ```
//!
//! The signer owns the request it is about to send, so paths and query values
//! arrive unencoded and are encoded here exactly once.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except the RFC 3986 unreserved set is percent-encoded.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build the full canonical request string.
///
/// `query` must already be canonical (see [`canonical_query_string`]).
///
/// # Examples
///
/// ```
/// use s3tests_auth::canonical::build_canonical_request;
///
/// let headers = vec![("host".to_owned(), "examplebucket.s3.amazonaws.com".to_owned())];
/// let canonical = build_canonical_request("GET", "/test.txt", "", &headers, "UNSIGNED-PAYLOAD");
/// assert!(canonical.starts_with("GET\n/test.txt\n\nhost:"));
/// ```
#[must_use]
pub fn build_canonical_request(
    method: &str,
    path: &str,
    query: &str,
    headers: &[(String, String)],
    payload_hash: &str,
) -> String {
    let canonical_uri = canonical_uri(path);
    let canonical_headers = canonical_headers(headers);
    let signed_headers = signed_headers(headers);
    format!("{method}\n{canonical_uri}\n{query}\n{canonical_headers}\n\n{signed_headers}\n{payload_hash}")
}

/// Encode a raw object path segment by segment, keeping `/` separators.
///
/// # Examples
///
/// ```
/// use s3tests_auth::canonical::canonical_uri;
///
/// assert_eq!(canonical_uri(""), "/");
/// assert_eq!(canonical_uri("/bucket/my key"), "/bucket/my%20key");
/// ```
#[must_use]
pub fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_owned();
    }
    path.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

/// Encode raw query pairs and sort them by encoded name, then value.
///
/// The result is also the query string to put on the wire, so the server sees
/// exactly the bytes that were signed.
///
/// # Examples
///
/// ```
/// use s3tests_auth::canonical::canonical_query_string;
///
/// let query = canonical_query_string(&[("uploads", ""), ("a b", "c/d")]);
/// assert_eq!(query, "a%20b=c%2Fd&uploads=");
/// ```
#[must_use]
pub fn canonical_query_string<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> String {
    let mut encoded: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (uri_encode(k.as_ref()), uri_encode(v.as_ref())))
        .collect();
    encoded.sort_unstable();
    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Canonical header block: lowercase names, sorted, values trimmed with inner
/// whitespace runs collapsed. Repeated names are joined with commas.
///
/// No trailing newline; [`build_canonical_request`] adds the separator.
#[must_use]
pub fn canonical_headers(headers: &[(String, String)]) -> String {
    let mut merged: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = collapse_whitespace(value.trim());
        merged
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    merged
        .iter()
        .map(|(name, value)| format!("{name}:{value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Semicolon-separated, sorted, de-duplicated lowercase header names.
///
/// # Examples
///
/// ```
/// use s3tests_auth::canonical::signed_headers;
///
/// let headers = vec![
///     ("X-Amz-Date".to_owned(), "20130524T000000Z".to_owned()),
///     ("Host".to_owned(), "example.com".to_owned()),
/// ];
/// assert_eq!(signed_headers(&headers), "host;x-amz-date");
/// ```
#[must_use]
pub fn signed_headers(headers: &[(String, String)]) -> String {
    let mut names: Vec<String> = headers.iter().map(|(n, _)| n.to_ascii_lowercase()).collect();
    names.sort_unstable();
    names.dedup();
    names.join(";")
}

/// Percent-encode a single component (path segment, query name or value).
#[must_use]
pub fn uri_encode(input: &str) -> String {
    utf8_percent_encode(input, URI_ENCODE_SET).to_string()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
