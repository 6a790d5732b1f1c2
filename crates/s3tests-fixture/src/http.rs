//! Hand-built HTTP requests the SDK cannot express.
//!
//! POST form uploads, CORS preflights, URL-addressed reads and writes,
//! header-signed and `aws-chunked` PUTs, and query-string presigned URLs all
//! go through [`RawHttp`]. TLS certificates are not verified because test
//! endpoints usually run with self-signed ones.

use std::time::Duration;

use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use s3tests_auth::chunked::sign_chunked_request;
use s3tests_auth::post_policy::{sign_policy_v2, sign_policy_v4};
use s3tests_auth::sigv2;
use s3tests_auth::sigv4::ALGORITHM;
use s3tests_auth::{
    PostPolicy, SignableRequest, SigningCredentials, SigningParams, hash_payload, presign_v2,
    presign_v4, sign_request,
};
use s3tests_core::{S3Config, SignatureVersion};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::DEFAULT_TIMEOUT;
use crate::context::TestContext;
use crate::error::{FixtureError, FixtureResult, SdkResultExt, ensure_eq};

/// `Content-Type` of URL-addressed writes.
pub const URL_CONTENT_TYPE: &str = "application/txt";

/// Form field carrying the uploaded file; always sent last.
pub const FILE_FIELD: &str = "file";

/// A raw response, fully buffered.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl RawResponse {
    async fn read(response: reqwest::Response) -> FixtureResult<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        debug!(%status, len = body.len(), "Raw response");
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Status as a number.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// A header value, if present and valid text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> FixtureResult<String> {
        Ok(String::from_utf8(self.body.to_vec())?)
    }

    /// `<Error><Code>` of an error body.
    pub fn error_code(&self) -> FixtureResult<String> {
        parse_error_code(&self.text()?)
    }

    /// Require `status` and, when given, the error `code`.
    pub fn ensure_status(&self, status: u16, code: Option<&str>) -> FixtureResult<()> {
        ensure_eq("status", status, self.status_code())?;
        if let Some(code) = code {
            ensure_eq("error code", code.to_owned(), self.error_code()?)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorDocument {
    code: String,
}

/// Read the `<Code>` of an S3 `<Error>` document.
pub fn parse_error_code(body: &str) -> FixtureResult<String> {
    let document: ErrorDocument = quick_xml::de::from_str(body)?;
    Ok(document.code)
}

/// A rejected unauthenticated or mis-signed request: 400 or 403.
pub fn error_check(status: u16) -> FixtureResult<()> {
    if matches!(status, 400 | 403) {
        Ok(())
    } else {
        Err(FixtureError::mismatch("status", "400 or 403", status))
    }
}

/// Raw HTTP client bound to one endpoint and the main user's keys.
#[derive(Debug, Clone)]
pub struct RawHttp {
    client: reqwest::Client,
    config: S3Config,
    secure: bool,
}

impl RawHttp {
    /// Build a client for `config`, using its `IsSecure` setting.
    pub fn new(config: S3Config) -> FixtureResult<Self> {
        let secure = config.is_secure;
        Self::with_scheme(config, secure)
    }

    /// Build a client forcing HTTP or HTTPS.
    pub fn with_scheme(config: S3Config, secure: bool) -> FixtureResult<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            config,
            secure,
        })
    }

    /// Address of a bucket.
    #[must_use]
    pub fn bucket_url(&self, bucket: &str) -> String {
        self.config.bucket_url(bucket, self.secure)
    }

    /// Address of an object.
    #[must_use]
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        self.config.object_url(bucket, key, self.secure)
    }

    fn credentials(&self) -> SigningCredentials {
        let user = &self.config.main_user;
        SigningCredentials::new(&user.access_key, &user.secret_key)
    }

    /// `Host` header value and unencoded path of an object.
    fn host_and_path(&self, bucket: &str, key: &str) -> (String, String) {
        if self.config.is_aws() {
            (
                format!("{bucket}.s3-{}.amazonaws.com", self.config.region),
                format!("/{key}"),
            )
        } else {
            let port = if self.secure {
                self.config.ssl_port
            } else {
                self.config.port
            };
            let host = self.config.url.trim().trim_end_matches('/');
            // The wire Host omits the scheme's default port.
            let default_port = if self.secure { 443 } else { 80 };
            let host = if port == default_port {
                host.to_owned()
            } else {
                format!("{host}:{port}")
            };
            (host, format!("/{bucket}/{key}"))
        }
    }

    /// Unsigned `GET` of a full URL.
    pub async fn get_object_by_url(&self, url: &str) -> FixtureResult<RawResponse> {
        debug!(%url, "GET by URL");
        let response = self.client.get(url).send().await?;
        RawResponse::read(response).await
    }

    /// Unsigned `PUT` of a full URL with `Content-Type: application/txt`.
    pub async fn put_object_by_url(
        &self,
        url: &str,
        body: impl Into<reqwest::Body>,
    ) -> FixtureResult<RawResponse> {
        debug!(%url, "PUT by URL");
        let response = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, URL_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        RawResponse::read(response).await
    }

    /// Send a CORS request and check the status and the two `Access-Control-Allow-*`
    /// headers, where `None` means the header must be absent.
    #[allow(clippy::too_many_arguments)]
    pub async fn cors_request_and_check(
        &self,
        method: Method,
        bucket: &str,
        key: Option<&str>,
        headers: &[(&str, &str)],
        status: u16,
        allow_origin: Option<&str>,
        allow_methods: Option<&str>,
    ) -> FixtureResult<RawResponse> {
        let url = match key {
            Some(key) => self.object_url(bucket, key),
            None => self.bucket_url(bucket),
        };
        let mut request = self.client.request(method, &url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = RawResponse::read(request.send().await?).await?;

        ensure_eq("CORS status", status, response.status_code())?;
        ensure_eq(
            "Access-Control-Allow-Origin",
            allow_origin,
            response.header("access-control-allow-origin"),
        )?;
        ensure_eq(
            "Access-Control-Allow-Methods",
            allow_methods,
            response.header("access-control-allow-methods"),
        )?;
        Ok(response)
    }

    /// Browser-style `POST` upload.
    ///
    /// Fields go out in the given order except [`FILE_FIELD`], which is moved
    /// to the end as a file part.
    pub async fn post_object(
        &self,
        bucket: &str,
        fields: &[(&str, &str)],
    ) -> FixtureResult<RawResponse> {
        let mut form = Form::new();
        let mut file = None;
        for (name, value) in fields {
            if *name == FILE_FIELD {
                file = Some((*value).to_owned());
            } else {
                form = form.text((*name).to_owned(), (*value).to_owned());
            }
        }
        if let Some(content) = file {
            form = form.part(
                FILE_FIELD,
                Part::bytes(content.into_bytes()).file_name(FILE_FIELD),
            );
        }

        let url = self.bucket_url(bucket);
        debug!(%url, "POST object");
        let response = self.client.post(&url).multipart(form).send().await?;
        RawResponse::read(response).await
    }

    /// Add the V2 credential fields (`AWSAccessKeyId`, `policy`, `signature`).
    pub fn post_form_v2(&self, policy: &PostPolicy) -> FixtureResult<Vec<(String, String)>> {
        let credentials = self.credentials();
        let encoded = policy.encode()?;
        let signature = sign_policy_v2(&credentials.secret_key, &encoded);
        Ok(vec![
            ("AWSAccessKeyId".to_owned(), credentials.access_key),
            ("policy".to_owned(), encoded),
            ("signature".to_owned(), signature),
        ])
    }

    /// Add the V4 credential conditions to `policy` and return the matching
    /// form fields, `x-amz-signature` included.
    pub fn post_form_v4(
        &self,
        policy: PostPolicy,
        time: DateTime<Utc>,
    ) -> FixtureResult<Vec<(String, String)>> {
        let credentials = self.credentials();
        let params = SigningParams::new(&credentials, &self.config.region, time);
        let credential = params.credential();
        let date = params.amz_date();
        let encoded = policy
            .field_equals("x-amz-algorithm", ALGORITHM)
            .field_equals("x-amz-credential", &credential)
            .field_equals("x-amz-date", &date)
            .encode()?;
        let signature = sign_policy_v4(&params, &encoded);
        Ok(vec![
            ("x-amz-algorithm".to_owned(), ALGORITHM.to_owned()),
            ("x-amz-credential".to_owned(), credential),
            ("x-amz-date".to_owned(), date),
            ("policy".to_owned(), encoded),
            ("x-amz-signature".to_owned(), signature),
        ])
    }

    /// `PUT` signed in the `Authorization` header.
    ///
    /// Uses V4 with a signed payload, or V2 when the config asks for it.
    pub async fn put_object_signed(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
    ) -> FixtureResult<RawResponse> {
        let credentials = self.credentials();
        let (host, path) = self.host_and_path(bucket, key);
        let now = Utc::now();

        let headers = match self.config.signature_version {
            SignatureVersion::V4 => {
                let params = SigningParams::new(&credentials, &self.config.region, now);
                let request = SignableRequest::new("PUT", &path, "")
                    .header("host", host)
                    .payload_hash(hash_payload(body));
                sign_request(&request, &params).headers
            }
            SignatureVersion::V2 => {
                warn!("Signing raw PUT with SigV2");
                let date = now.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
                let resource = format!("/{bucket}/{key}");
                let string_to_sign = sigv2::string_to_sign("PUT", "", "", &date, &[], &resource);
                let signature = s3tests_auth::sign_v2(&credentials.secret_key, &string_to_sign);
                vec![
                    ("host".to_owned(), host),
                    ("date".to_owned(), date),
                    (
                        "authorization".to_owned(),
                        sigv2::authorization_header(&credentials.access_key, &signature),
                    ),
                ]
            }
        };

        let mut request = self.client.put(self.object_url(bucket, key));
        for (name, value) in headers {
            request = request.header(name, value);
        }
        let response = request.body(body.to_vec()).send().await?;
        RawResponse::read(response).await
    }

    /// `PUT` with a `STREAMING-AWS4-HMAC-SHA256-PAYLOAD` body cut into
    /// `chunk_size`-byte signed chunks.
    pub async fn put_object_chunked(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        chunk_size: usize,
    ) -> FixtureResult<RawResponse> {
        let credentials = self.credentials();
        let params = SigningParams::new(&credentials, &self.config.region, Utc::now());
        let (host, path) = self.host_and_path(bucket, key);
        let request = SignableRequest::new("PUT", &path, "").header("host", host);
        let (signed, framed) = sign_chunked_request(request, &params, body, chunk_size)?;

        let mut request = self.client.put(self.object_url(bucket, key));
        for (name, value) in signed.headers {
            request = request.header(name, value);
        }
        let response = request.body(framed).send().await?;
        RawResponse::read(response).await
    }

    /// SigV4 query-presigned URL for `method` on an object.
    #[must_use]
    pub fn presign_v4_url(
        &self,
        method: &str,
        bucket: &str,
        key: &str,
        expires: Duration,
        time: DateTime<Utc>,
    ) -> String {
        let credentials = self.credentials();
        let params = SigningParams::new(&credentials, &self.config.region, time);
        let (host, path) = self.host_and_path(bucket, key);
        let query = presign_v4(method, &host, &path, &params, expires.as_secs(), &[]);
        format!("{}?{query}", self.object_url(bucket, key))
    }

    /// SigV2 query-presigned URL; `expires_at` is epoch seconds.
    #[must_use]
    pub fn presign_v2_url(&self, method: &str, bucket: &str, key: &str, expires_at: i64) -> String {
        let query = presign_v2(
            method,
            &format!("/{bucket}/{key}"),
            &self.credentials(),
            expires_at,
        );
        format!("{}?{query}", self.object_url(bucket, key))
    }
}

/// SDK-presigned `GetObject` URL.
pub async fn presigned_get_url(
    client: &Client,
    bucket: &str,
    key: &str,
    expires: Duration,
) -> FixtureResult<String> {
    let request = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .presigned(PresigningConfig::expires_in(expires)?)
        .await
        .op("GetObject")?;
    Ok(request.uri().to_owned())
}

/// SDK-presigned `PutObject` URL.
pub async fn presigned_put_url(
    client: &Client,
    bucket: &str,
    key: &str,
    expires: Duration,
) -> FixtureResult<String> {
    let request = client
        .put_object()
        .bucket(bucket)
        .key(key)
        .content_type(URL_CONTENT_TYPE)
        .presigned(PresigningConfig::expires_in(expires)?)
        .await
        .op("PutObject")?;
    Ok(request.uri().to_owned())
}

impl TestContext {
    /// Raw client for this context's endpoint.
    pub fn raw_http(&self) -> FixtureResult<RawHttp> {
        RawHttp::new(self.config().clone())
    }
}
