//! Suite configuration loaded from an INI file.
//!
//! The file path is taken from `S3TESTS_INI` and falls back to `s3tests.ini`
//! in the working directory. Section and key names are matched without regard
//! to case so hand-edited files with `[main user]` or `accesskey` still load.
//!
//! ```text
//! [S3]
//! URL = 192.168.11.245
//! Port = 8080
//! SSLPort = 8443
//! SignatureVersion = 4
//! IsSecure = false
//! RegionName = ap-northeast-2
//!
//! [Fixtures]
//! BucketPrefix = v2-{random}-
//! NotDelete = false
//!
//! [Main User]
//! DisplayName = main
//! UserID = 1
//! Email = main@example.com
//! AccessKey = ...
//! SecretKey = ...
//! KMS =
//! ```

use std::collections::HashMap;
use std::path::Path;

use config::{Config, File, FileFormat};
use tracing::debug;

use crate::error::{S3TestsError, S3TestsResult};
use crate::types::{SignatureVersion, UserData};

/// Environment variable naming the INI file.
pub const CONFIG_PATH_ENV: &str = "S3TESTS_INI";

/// INI file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "s3tests.ini";

/// Region used when `RegionName` is absent.
pub const DEFAULT_REGION: &str = "ap-northeast-2";

const SECTION_S3: &str = "S3";
const SECTION_FIXTURES: &str = "Fixtures";
const SECTION_MAIN_USER: &str = "Main User";
const SECTION_ALT_USER: &str = "Alt User";
const SECTION_BACKEND_USER: &str = "Backend User";

/// Connection settings and credentials for the endpoint under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    /// Endpoint host. Empty means the suite targets AWS itself.
    pub url: String,
    /// Plain HTTP port.
    pub port: u16,
    /// HTTPS port.
    pub ssl_port: u16,
    /// Signing flavour requested by the config.
    pub signature_version: SignatureVersion,
    /// Whether the default clients talk HTTPS.
    pub is_secure: bool,
    /// Signing region.
    pub region: String,
    /// Bucket name prefix, possibly containing a `{random}` placeholder.
    pub bucket_prefix: String,
    /// Skip teardown so buckets can be inspected after a run.
    pub not_delete: bool,
    /// Owner of most fixtures.
    pub main_user: UserData,
    /// Second account for cross-account checks.
    pub alt_user: UserData,
    /// Credentials for the vendor backend client. Defaults to the main user.
    pub backend_user: UserData,
}

impl S3Config {
    /// Load from the file named by `S3TESTS_INI`, or `s3tests.ini`.
    pub fn load() -> S3TestsResult<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
        Self::from_path(path)
    }

    /// Load from an explicit INI file path.
    pub fn from_path(path: impl AsRef<Path>) -> S3TestsResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading s3tests config");
        let source = Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini).required(true))
            .build()?;
        Self::from_source(source)
    }

    /// Parse INI text directly.
    pub fn from_ini_str(text: &str) -> S3TestsResult<Self> {
        let source = Config::builder()
            .add_source(File::from_str(text, FileFormat::Ini))
            .build()?;
        Self::from_source(source)
    }

    fn from_source(source: Config) -> S3TestsResult<Self> {
        let doc = IniDocument::new(source.try_deserialize()?);

        let main_user = doc.user(SECTION_MAIN_USER)?;
        let alt_user = doc.user(SECTION_ALT_USER)?;
        let backend_user = if doc.has_section(SECTION_BACKEND_USER) {
            doc.user(SECTION_BACKEND_USER)?
        } else {
            main_user.clone()
        };

        Ok(Self {
            url: doc.string(SECTION_S3, "URL"),
            port: doc.port(SECTION_S3, "Port", 80)?,
            ssl_port: doc.port(SECTION_S3, "SSLPort", 443)?,
            signature_version: SignatureVersion::from_config_value(
                &doc.string(SECTION_S3, "SignatureVersion"),
            ),
            is_secure: doc.flag(SECTION_S3, "IsSecure"),
            region: doc
                .get(SECTION_S3, "RegionName")
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_REGION)
                .to_owned(),
            bucket_prefix: doc.string(SECTION_FIXTURES, "BucketPrefix"),
            not_delete: doc.flag(SECTION_FIXTURES, "NotDelete"),
            main_user,
            alt_user,
            backend_user,
        })
    }

    /// True when no custom endpoint is configured and the suite runs against AWS.
    #[must_use]
    pub fn is_aws(&self) -> bool {
        self.url.trim().is_empty()
    }

    /// Service endpoint for SDK clients.
    #[must_use]
    pub fn endpoint(&self, secure: bool) -> String {
        let scheme = scheme(secure);
        if self.is_aws() {
            return format!("{scheme}://s3.{}.amazonaws.com", self.region);
        }
        let port = if secure { self.ssl_port } else { self.port };
        format!("{scheme}://{}:{port}", self.url.trim().trim_end_matches('/'))
    }

    /// Address of a bucket for raw HTTP requests.
    ///
    /// AWS is addressed virtual-host style, everything else path style.
    #[must_use]
    pub fn bucket_url(&self, bucket: &str, secure: bool) -> String {
        if self.is_aws() {
            format!("{}://{bucket}.s3-{}.amazonaws.com", scheme(secure), self.region)
        } else {
            format!("{}/{bucket}", self.endpoint(secure))
        }
    }

    /// Address of an object for raw HTTP requests.
    #[must_use]
    pub fn object_url(&self, bucket: &str, key: &str, secure: bool) -> String {
        format!("{}/{key}", self.bucket_url(bucket, secure))
    }
}

fn scheme(secure: bool) -> &'static str {
    if secure { "https" } else { "http" }
}

/// INI contents with section and key names folded to lowercase.
struct IniDocument {
    sections: HashMap<String, HashMap<String, String>>,
}

impl IniDocument {
    fn new(raw: HashMap<String, HashMap<String, String>>) -> Self {
        let sections = raw
            .into_iter()
            .map(|(section, entries)| {
                let entries = entries
                    .into_iter()
                    .map(|(k, v)| (k.to_ascii_lowercase(), v.trim().to_owned()))
                    .collect();
                (section.to_ascii_lowercase(), entries)
            })
            .collect();
        Self { sections }
    }

    fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(&section.to_ascii_lowercase())
    }

    fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(&section.to_ascii_lowercase())
            .and_then(|entries| entries.get(&key.to_ascii_lowercase()))
            .map(String::as_str)
    }

    fn string(&self, section: &str, key: &str) -> String {
        self.get(section, key).unwrap_or_default().to_owned()
    }

    fn flag(&self, section: &str, key: &str) -> bool {
        self.get(section, key)
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    }

    fn port(&self, section: &str, key: &str, default: u16) -> S3TestsResult<u16> {
        match self.get(section, key).filter(|v| !v.is_empty()) {
            None => Ok(default),
            Some(v) => v.parse().map_err(|_| S3TestsError::InvalidValue {
                section: section.to_owned(),
                key: key.to_owned(),
                value: v.to_owned(),
            }),
        }
    }

    fn user(&self, section: &str) -> S3TestsResult<UserData> {
        if !self.has_section(section) {
            return Err(S3TestsError::MissingSection(section.to_owned()));
        }
        Ok(UserData {
            display_name: self.string(section, "DisplayName"),
            user_id: self.string(section, "UserID"),
            email: self.string(section, "Email"),
            access_key: self.string(section, "AccessKey"),
            secret_key: self.string(section, "SecretKey"),
            kms: self.string(section, "KMS"),
        })
    }
}
