//! Browser-based POST upload policies.
//!
//! A policy is a JSON document with an `expiration` and a list of
//! `conditions`. It travels base64-encoded in the `policy` form field and is
//! signed either with V2 (`signature`, base64 HMAC-SHA1) or V4
//! (`x-amz-signature`, hex HMAC-SHA256 with the derived signing key).

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::AuthError;
use crate::sigv2;
use crate::sigv4::{SigningParams, compute_signature};

/// `expiration` format expected by S3.
pub const EXPIRATION_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A POST policy under construction.
#[derive(Debug, Clone, Serialize)]
pub struct PostPolicy {
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration: Option<String>,
    conditions: Vec<Value>,
}

impl PostPolicy {
    /// Policy that expires at the given instant.
    #[must_use]
    pub fn expiring_at(time: DateTime<Utc>) -> Self {
        Self::with_expiration(time.format(EXPIRATION_FORMAT).to_string())
    }

    /// Policy with a verbatim `expiration` string (malformed values included).
    #[must_use]
    pub fn with_expiration(expiration: impl Into<String>) -> Self {
        Self {
            expiration: Some(expiration.into()),
            conditions: Vec::new(),
        }
    }

    /// Policy without an `expiration` field.
    #[must_use]
    pub fn without_expiration() -> Self {
        Self {
            expiration: None,
            conditions: Vec::new(),
        }
    }

    /// Exact-match condition: `{"field": "value"}`.
    #[must_use]
    pub fn field_equals(mut self, field: &str, value: &str) -> Self {
        let mut entry = serde_json::Map::new();
        entry.insert(field.to_owned(), Value::from(value));
        self.conditions.push(Value::Object(entry));
        self
    }

    /// Prefix condition: `["starts-with", "$field", "prefix"]`.
    #[must_use]
    pub fn starts_with(mut self, field: &str, prefix: &str) -> Self {
        self.conditions
            .push(json!(["starts-with", format!("${field}"), prefix]));
        self
    }

    /// `["content-length-range", min, max]`.
    #[must_use]
    pub fn content_length_range(mut self, min: i64, max: i64) -> Self {
        self.conditions.push(json!(["content-length-range", min, max]));
        self
    }

    /// Append an arbitrary condition value.
    #[must_use]
    pub fn condition(mut self, condition: Value) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Serialized JSON document.
    pub fn to_json(&self) -> Result<String, AuthError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Base64 of the JSON document, the `policy` form field.
    pub fn encode(&self) -> Result<String, AuthError> {
        Ok(BASE64.encode(self.to_json()?))
    }
}

/// Base64 of any JSON value, for hand-crafted invalid documents.
#[must_use]
pub fn encode_document(document: &Value) -> String {
    BASE64.encode(document.to_string())
}

/// V2 `signature` field for an encoded policy.
#[must_use]
pub fn sign_policy_v2(secret_key: &str, encoded_policy: &str) -> String {
    sigv2::sign_v2(secret_key, encoded_policy)
}

/// V4 `x-amz-signature` field for an encoded policy.
#[must_use]
pub fn sign_policy_v4(params: &SigningParams<'_>, encoded_policy: &str) -> String {
    compute_signature(&params.signing_key(), encoded_policy)
}
