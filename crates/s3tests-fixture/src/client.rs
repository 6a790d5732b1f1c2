//! S3 client construction.
//!
//! Every client the suite uses comes out of [`ClientFactory`]: main, alt,
//! anonymous, deliberately mis-signed, TLS and backend variants. They share a
//! short timeout and a single retry so server errors surface quickly.

use std::sync::Arc;
use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::interceptors::BeforeTransmitInterceptorContextMut;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{
    ConfigBag, Credentials, Intercept, Region, RequestChecksumCalculation,
    ResponseChecksumValidation, RuntimeComponents,
};
use aws_smithy_runtime_api::box_error::BoxError;
use s3tests_core::{S3Config, SignatureVersion, UserData};
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

/// Total attempts (first try plus one retry) for ordinary clients.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Connect and read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Access key used by `bad_auth_client` when none is given.
pub const BAD_ACCESS_KEY: &str = "aaaaaaaaaaaaaaa";

/// Secret key used by `bad_auth_client` when none is given.
pub const BAD_SECRET_KEY: &str = "bbbbbbbbbbbbbbb";

const PROVIDER_NAME: &str = "s3tests";

/// Which identity a client signs as.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClientCredentials {
    /// `[Main User]`.
    #[default]
    Main,
    /// `[Alt User]`.
    Alt,
    /// `[Backend User]`.
    Backend,
    /// Unsigned requests.
    Anonymous,
    /// An explicit key pair.
    Static {
        /// Access key id.
        access_key: String,
        /// Secret access key.
        secret_key: String,
    },
}

/// Every knob of a client.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ClientOptions {
    /// Signing identity.
    #[builder(default)]
    pub credentials: ClientCredentials,

    /// Use the TLS endpoint; `None` follows `IsSecure`.
    #[builder(default, setter(strip_option))]
    pub secure: Option<bool>,

    /// When the SDK attaches request checksums.
    #[builder(default = RequestChecksumCalculation::WhenRequired)]
    pub checksum_calculation: RequestChecksumCalculation,

    /// When the SDK validates response checksums.
    #[builder(default = ResponseChecksumValidation::WhenRequired)]
    pub checksum_validation: ResponseChecksumValidation,

    /// Total attempts per request.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Connect and read timeout.
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,

    /// Headers added to every request before signing.
    #[builder(default)]
    pub extra_headers: Vec<(String, String)>,
}

/// Adds fixed headers to every outgoing request, before it is signed.
#[derive(Debug, Clone)]
pub struct StaticHeaders {
    headers: Arc<Vec<(String, String)>>,
}

impl StaticHeaders {
    /// Interceptor adding `headers`.
    #[must_use]
    pub fn new(headers: Vec<(String, String)>) -> Self {
        Self {
            headers: Arc::new(headers),
        }
    }
}

impl Intercept for StaticHeaders {
    fn name(&self) -> &'static str {
        "StaticHeaders"
    }

    fn modify_before_signing(
        &self,
        context: &mut BeforeTransmitInterceptorContextMut<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        let headers = context.request_mut().headers_mut();
        for (name, value) in self.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        Ok(())
    }
}

/// Builds SDK clients against the configured endpoint.
#[derive(Debug, Clone)]
pub struct ClientFactory {
    config: Arc<S3Config>,
}

impl ClientFactory {
    /// Factory for `config`.
    #[must_use]
    pub fn new(config: Arc<S3Config>) -> Self {
        if config.signature_version == SignatureVersion::V2 {
            warn!("SignatureVersion 2 is not supported by SDK clients; they sign with SigV4");
        }
        Self { config }
    }

    /// Settings the factory was built from.
    #[must_use]
    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Main user client.
    #[must_use]
    pub fn client(&self) -> Client {
        self.build(&ClientOptions::builder().build(), None)
    }

    /// Alt user client.
    #[must_use]
    pub fn alt_client(&self) -> Client {
        self.build(
            &ClientOptions::builder()
                .credentials(ClientCredentials::Alt)
                .build(),
            None,
        )
    }

    /// Main user client on the TLS endpoint, required for SSE-C.
    #[must_use]
    pub fn https_client(&self) -> Client {
        self.build(&ClientOptions::builder().secure(true).build(), None)
    }

    /// Client signing with a key pair the server does not know.
    #[must_use]
    pub fn bad_auth_client(&self, access_key: Option<&str>, secret_key: Option<&str>) -> Client {
        let credentials = ClientCredentials::Static {
            access_key: access_key.unwrap_or(BAD_ACCESS_KEY).to_owned(),
            secret_key: secret_key.unwrap_or(BAD_SECRET_KEY).to_owned(),
        };
        self.build(
            &ClientOptions::builder().credentials(credentials).build(),
            None,
        )
    }

    /// Backend user client sending the vendor backend headers on every request.
    #[must_use]
    pub fn backend_client(&self) -> Client {
        self.build(&crate::backend::backend_client_options(), None)
    }

    /// Client that sends unsigned requests.
    pub async fn public_client(&self) -> Client {
        self.client_with(
            ClientOptions::builder()
                .credentials(ClientCredentials::Anonymous)
                .build(),
        )
        .await
    }

    /// Client with arbitrary options.
    pub async fn client_with(&self, options: ClientOptions) -> Client {
        if options.credentials == ClientCredentials::Anonymous {
            let shared = aws_config::defaults(BehaviorVersion::latest())
                .no_credentials()
                .region(Region::new(self.config.region.clone()))
                .load()
                .await;
            return self.build(&options, Some(aws_sdk_s3::config::Builder::from(&shared)));
        }
        self.build(&options, None)
    }

    fn user(&self, credentials: &ClientCredentials) -> Option<Credentials> {
        let user: &UserData = match credentials {
            ClientCredentials::Main => &self.config.main_user,
            ClientCredentials::Alt => &self.config.alt_user,
            ClientCredentials::Backend => &self.config.backend_user,
            ClientCredentials::Anonymous => return None,
            ClientCredentials::Static {
                access_key,
                secret_key,
            } => {
                return Some(Credentials::new(
                    access_key,
                    secret_key,
                    None,
                    None,
                    PROVIDER_NAME,
                ));
            }
        };
        Some(Credentials::new(
            &user.access_key,
            &user.secret_key,
            None,
            None,
            PROVIDER_NAME,
        ))
    }

    fn build(&self, options: &ClientOptions, base: Option<aws_sdk_s3::config::Builder>) -> Client {
        let secure = options.secure.unwrap_or(self.config.is_secure);
        let endpoint = self.config.endpoint(secure);
        debug!(%endpoint, credentials = ?options.credentials, "Building S3 client");

        let mut builder = base
            .unwrap_or_default()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.config.region.clone()))
            .endpoint_url(endpoint)
            .force_path_style(!self.config.is_aws())
            .request_checksum_calculation(options.checksum_calculation.clone())
            .response_checksum_validation(options.checksum_validation.clone())
            .retry_config(RetryConfig::standard().with_max_attempts(options.max_attempts))
            .timeout_config(
                TimeoutConfig::builder()
                    .connect_timeout(options.timeout)
                    .read_timeout(options.timeout)
                    .build(),
            );

        if let Some(credentials) = self.user(&options.credentials) {
            builder = builder.credentials_provider(credentials);
        }
        if !options.extra_headers.is_empty() {
            builder = builder.interceptor(StaticHeaders::new(options.extra_headers.clone()));
        }

        Client::from_conf(builder.build())
    }
}
