//! Key pair used for signing.

/// Access key and secret used to sign a raw request.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningCredentials {
    /// Access key id, sent in the clear.
    pub access_key: String,
    /// Secret key, only ever used as HMAC input.
    pub secret_key: String,
}

impl SigningCredentials {
    /// Create a key pair.
    #[must_use]
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl std::fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"** redacted **")
            .finish()
    }
}
