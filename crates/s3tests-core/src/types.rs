//! Credential sets and signing flavours.

use std::fmt;

/// Which request-signing scheme the target expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SignatureVersion {
    /// Legacy HMAC-SHA1 signing.
    V2,
    /// AWS Signature Version 4.
    #[default]
    V4,
}

impl SignatureVersion {
    /// Interpret the `SignatureVersion` config value. Only `"2"` selects V2.
    #[must_use]
    pub fn from_config_value(value: &str) -> Self {
        if value.trim() == "2" { Self::V2 } else { Self::V4 }
    }
}

impl fmt::Display for SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2 => f.write_str("v2"),
            Self::V4 => f.write_str("v4"),
        }
    }
}

/// One credential set from the config file (`[Main User]`, `[Alt User]`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserData {
    /// Display name, also used as the IAM user name in ARNs.
    pub display_name: String,
    /// Canonical user id.
    pub user_id: String,
    /// Email address (grants by email).
    pub email: String,
    /// Access key id.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
    /// KMS key id used by SSE-KMS scenarios.
    pub kms: String,
}

impl UserData {
    /// IAM ARN of this user, used as a policy principal.
    #[must_use]
    pub fn arn(&self) -> String {
        format!("arn:aws:iam::{}:user/{}", self.user_id, self.display_name)
    }

    /// Whether the section carried no credentials at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_key.is_empty() && self.secret_key.is_empty()
    }
}
