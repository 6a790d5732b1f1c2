//! Header-based AWS Signature Version 4 signing.
//!
//! 1. Build the canonical request from method, path, query, headers and payload hash.
//! 2. Build the string to sign from the timestamp, scope and canonical request hash.
//! 3. Derive the signing key from the secret and the scope components.
//! 4. Emit `Authorization: AWS4-HMAC-SHA256 Credential=.., SignedHeaders=.., Signature=..`.

use chrono::{DateTime, Utc};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::canonical::{build_canonical_request, signed_headers};
use crate::credentials::SigningCredentials;

/// Signing algorithm identifier.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Service name used in the credential scope.
pub const SERVICE: &str = "s3";

/// Hex SHA-256 of an empty body.
pub const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Payload hash for requests whose body is not signed.
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Payload hash announcing an `aws-chunked` body with per-chunk signatures.
pub const STREAMING_PAYLOAD: &str = "STREAMING-AWS4-HMAC-SHA256-PAYLOAD";

const SCOPE_TERMINATOR: &str = "aws4_request";

type HmacSha256 = Hmac<Sha256>;

/// Who signs, where, and when.
#[derive(Debug, Clone)]
pub struct SigningParams<'a> {
    /// Key pair.
    pub credentials: &'a SigningCredentials,
    /// Region in the credential scope.
    pub region: &'a str,
    /// Service in the credential scope.
    pub service: &'a str,
    /// Request timestamp.
    pub time: DateTime<Utc>,
}

impl<'a> SigningParams<'a> {
    /// Params for the `s3` service.
    #[must_use]
    pub fn new(credentials: &'a SigningCredentials, region: &'a str, time: DateTime<Utc>) -> Self {
        Self {
            credentials,
            region,
            service: SERVICE,
            time,
        }
    }

    /// `YYYYMMDD`.
    #[must_use]
    pub fn date_stamp(&self) -> String {
        self.time.format("%Y%m%d").to_string()
    }

    /// `YYYYMMDDTHHMMSSZ`, the `x-amz-date` value.
    #[must_use]
    pub fn amz_date(&self) -> String {
        self.time.format("%Y%m%dT%H%M%SZ").to_string()
    }

    /// `date/region/service/aws4_request`.
    #[must_use]
    pub fn scope(&self) -> String {
        format!(
            "{}/{}/{}/{SCOPE_TERMINATOR}",
            self.date_stamp(),
            self.region,
            self.service
        )
    }

    /// `access_key/scope`, the `Credential=` value.
    #[must_use]
    pub fn credential(&self) -> String {
        format!("{}/{}", self.credentials.access_key, self.scope())
    }

    /// Derived signing key for this scope.
    #[must_use]
    pub fn signing_key(&self) -> Vec<u8> {
        derive_signing_key(
            &self.credentials.secret_key,
            &self.date_stamp(),
            self.region,
            self.service,
        )
    }
}

/// A request about to be sent, in unencoded form.
#[derive(Debug, Clone)]
pub struct SignableRequest {
    /// HTTP method.
    pub method: String,
    /// Raw path, e.g. `/bucket/key with space`.
    pub path: String,
    /// Canonical (already encoded and sorted) query string.
    pub query: String,
    /// Headers to sign. `host` must be present.
    pub headers: Vec<(String, String)>,
    /// Hex SHA-256 of the body, or one of the sentinel payload hashes.
    pub payload_hash: String,
}

impl SignableRequest {
    /// Start a request with an unsigned payload and no headers.
    #[must_use]
    pub fn new(method: &str, path: &str, query: &str) -> Self {
        Self {
            method: method.to_owned(),
            path: path.to_owned(),
            query: query.to_owned(),
            headers: Vec::new(),
            payload_hash: UNSIGNED_PAYLOAD.to_owned(),
        }
    }

    /// Add a header to sign.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    /// Sign the given body hash instead of `UNSIGNED-PAYLOAD`.
    #[must_use]
    pub fn payload_hash(mut self, hash: impl Into<String>) -> Self {
        self.payload_hash = hash.into();
        self
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n == name)
    }
}

/// Output of [`sign_request`].
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// Every header to send, including `x-amz-date`, `x-amz-content-sha256`
    /// and `authorization`.
    pub headers: Vec<(String, String)>,
    /// The `Authorization` header value.
    pub authorization: String,
    /// Hex signature; the seed signature for chunked uploads.
    pub signature: String,
}

/// Sign a request with SigV4 in the `Authorization` header.
///
/// `x-amz-date` and `x-amz-content-sha256` are added when the caller has not
/// supplied them.
#[must_use]
pub fn sign_request(request: &SignableRequest, params: &SigningParams<'_>) -> SignedRequest {
    let mut headers = request.headers.clone();
    if !request.has_header("x-amz-date") {
        headers.push(("x-amz-date".to_owned(), params.amz_date()));
    }
    if !request.has_header("x-amz-content-sha256") {
        headers.push((
            "x-amz-content-sha256".to_owned(),
            request.payload_hash.clone(),
        ));
    }

    let canonical = build_canonical_request(
        &request.method,
        &request.path,
        &request.query,
        &headers,
        &request.payload_hash,
    );
    debug!(canonical_request = ?canonical, "Built canonical request");

    let string_to_sign = build_string_to_sign(
        &params.amz_date(),
        &params.scope(),
        &hash_payload(canonical.as_bytes()),
    );
    let signature = compute_signature(&params.signing_key(), &string_to_sign);
    let authorization = format!(
        "{ALGORITHM} Credential={}, SignedHeaders={}, Signature={signature}",
        params.credential(),
        signed_headers(&headers),
    );

    headers.push(("authorization".to_owned(), authorization.clone()));
    SignedRequest {
        headers,
        authorization,
        signature,
    }
}

/// `AWS4-HMAC-SHA256\n{timestamp}\n{scope}\n{hash}`.
///
/// # Examples
///
/// ```
/// use s3tests_auth::sigv4::build_string_to_sign;
///
/// let sts = build_string_to_sign("20130524T000000Z", "20130524/us-east-1/s3/aws4_request", "abc");
/// assert_eq!(sts, "AWS4-HMAC-SHA256\n20130524T000000Z\n20130524/us-east-1/s3/aws4_request\nabc");
/// ```
#[must_use]
pub fn build_string_to_sign(timestamp: &str, scope: &str, canonical_request_hash: &str) -> String {
    format!("{ALGORITHM}\n{timestamp}\n{scope}\n{canonical_request_hash}")
}

/// HMAC chain `AWS4{secret}` -> date -> region -> service -> `aws4_request`.
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let date_key = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let region_key = hmac_sha256(&date_key, region.as_bytes());
    let service_key = hmac_sha256(&region_key, service.as_bytes());
    hmac_sha256(&service_key, SCOPE_TERMINATOR.as_bytes())
}

/// Hex HMAC-SHA256 of `data` under `signing_key`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Hex SHA-256 of a payload, the `x-amz-content-sha256` value.
///
/// # Examples
///
/// ```
/// use s3tests_auth::sigv4::{EMPTY_PAYLOAD_SHA256, hash_payload};
///
/// assert_eq!(hash_payload(b""), EMPTY_PAYLOAD_SHA256);
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

pub(crate) fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = <HmacSha256 as KeyInit>::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
