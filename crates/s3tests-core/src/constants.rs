//! Values the suite asserts against or sends verbatim.

/// Byte sizes.
pub mod sizes {
    /// One kibibyte.
    pub const KB: usize = 1024;
    /// One mebibyte.
    pub const MB: usize = 1024 * KB;
    /// One gibibyte.
    pub const GB: usize = 1024 * MB;
}

/// S3 error codes returned in `<Error><Code>`.
pub mod codes {
    #![allow(missing_docs)]

    pub const ACCESS_DENIED: &str = "AccessDenied";
    pub const ACCESS_CONTROL_LIST_NOT_SUPPORTED: &str = "AccessControlListNotSupported";
    pub const BAD_DIGEST: &str = "BadDigest";
    pub const BAD_REQUEST: &str = "BadRequest";
    pub const BUCKET_ALREADY_EXISTS: &str = "BucketAlreadyExists";
    pub const BUCKET_ALREADY_OWNED_BY_YOU: &str = "BucketAlreadyOwnedByYou";
    pub const BUCKET_NOT_EMPTY: &str = "BucketNotEmpty";
    pub const ENTITY_TOO_LARGE: &str = "EntityTooLarge";
    pub const ENTITY_TOO_SMALL: &str = "EntityTooSmall";
    pub const INVALID_ACCESS_KEY_ID: &str = "InvalidAccessKeyId";
    pub const INVALID_ARGUMENT: &str = "InvalidArgument";
    pub const INVALID_BUCKET_NAME: &str = "InvalidBucketName";
    pub const INVALID_BUCKET_STATE: &str = "InvalidBucketState";
    pub const INVALID_CONFIGURATION_ID: &str = "InvalidConfigurationId";
    pub const INVALID_DIGEST: &str = "InvalidDigest";
    pub const INVALID_ENCRYPTION_ALGORITHM: &str = "InvalidEncryptionAlgorithmError";
    pub const INVALID_PART: &str = "InvalidPart";
    pub const INVALID_PART_ORDER: &str = "InvalidPartOrder";
    pub const INVALID_RANGE: &str = "InvalidRange";
    pub const INVALID_REQUEST: &str = "InvalidRequest";
    pub const INVALID_RETENTION_PERIOD: &str = "InvalidRetentionPeriod";
    pub const INVALID_TAG: &str = "InvalidTag";
    pub const INVALID_TARGET_BUCKET_FOR_LOGGING: &str = "InvalidTargetBucketForLogging";
    pub const MALFORMED_ACL_ERROR: &str = "MalformedACLError";
    pub const MALFORMED_XML: &str = "MalformedXML";
    pub const MALFORMED_POLICY: &str = "MalformedPolicy";
    pub const METHOD_NOT_ALLOWED: &str = "MethodNotAllowed";
    pub const MISSING_CONTENT_LENGTH: &str = "MissingContentLength";
    pub const NO_SUCH_BUCKET: &str = "NoSuchBucket";
    pub const NO_SUCH_BUCKET_POLICY: &str = "NoSuchBucketPolicy";
    pub const NO_SUCH_CONFIGURATION: &str = "NoSuchConfiguration";
    pub const NO_SUCH_CORS_CONFIGURATION: &str = "NoSuchCORSConfiguration";
    pub const NO_SUCH_INVENTORY_CONFIGURATION: &str = "NoSuchInventoryConfiguration";
    pub const NO_SUCH_KEY: &str = "NoSuchKey";
    pub const NO_SUCH_LIFECYCLE_CONFIGURATION: &str = "NoSuchLifecycleConfiguration";
    pub const NO_SUCH_METRICS_CONFIGURATION: &str = "NoSuchMetricsConfiguration";
    pub const NO_SUCH_NOTIFICATION_CONFIGURATION: &str = "NoSuchNotificationConfiguration";
    pub const NO_SUCH_PUBLIC_ACCESS_BLOCK_CONFIGURATION: &str =
        "NoSuchPublicAccessBlockConfiguration";
    pub const NO_SUCH_TAG_SET: &str = "NoSuchTagSet";
    pub const NO_SUCH_UPLOAD: &str = "NoSuchUpload";
    pub const NO_SUCH_VERSION: &str = "NoSuchVersion";
    pub const NO_SUCH_WEBSITE_CONFIGURATION: &str = "NoSuchWebsiteConfiguration";
    pub const NOT_IMPLEMENTED: &str = "NotImplemented";
    pub const OBJECT_LOCK_CONFIGURATION_NOT_FOUND: &str = "ObjectLockConfigurationNotFoundError";
    pub const PERMANENT_REDIRECT: &str = "PermanentRedirect";
    pub const PRECONDITION_FAILED: &str = "PreconditionFailed";
    pub const REPLICATION_CONFIGURATION_NOT_FOUND: &str = "ReplicationConfigurationNotFoundError";
    pub const SERVER_SIDE_ENCRYPTION_CONFIGURATION_NOT_FOUND: &str =
        "ServerSideEncryptionConfigurationNotFoundError";
    pub const SIGNATURE_DOES_NOT_MATCH: &str = "SignatureDoesNotMatch";
}

/// Bucket policy document vocabulary.
pub mod policy {
    #![allow(missing_docs)]

    pub const VERSION: &str = "Version";
    pub const VERSION_DATE: &str = "2012-10-17";
    pub const STATEMENT: &str = "Statement";
    pub const EFFECT: &str = "Effect";
    pub const PRINCIPAL: &str = "Principal";
    pub const NOT_PRINCIPAL: &str = "NotPrincipal";
    pub const ACTION: &str = "Action";
    pub const RESOURCE: &str = "Resource";
    pub const CONDITION: &str = "Condition";
    pub const ALLOW: &str = "Allow";
    pub const DENY: &str = "Deny";
    pub const RESOURCE_PREFIX: &str = "arn:aws:s3:::";
}

/// Predefined ACL group grantees.
pub mod groups {
    /// Everyone, including anonymous requests.
    pub const ALL_USERS: &str = "http://acs.amazonaws.com/groups/global/AllUsers";
    /// Any signed request.
    pub const AUTHENTICATED_USERS: &str = "http://acs.amazonaws.com/groups/global/AuthenticatedUsers";
}

/// Shared customer-provided encryption key.
pub mod sse {
    /// Base64 AES-256 key.
    pub const KEY: &str = "pO3upElrwuEXSoFwCfnZPdSsmt/xWeFa0N9KgDijwVs=";
    /// Base64 MD5 of the decoded key.
    pub const KEY_MD5: &str = "DWygnHRtgiJ77HCm+1rvHw==";
    /// Algorithm name for both SSE-S3 and SSE-C.
    pub const ALGORITHM: &str = "AES256";
}

/// Message prefix used by content comparisons.
pub const NOT_MATCHED: &str = "Source does not match target";

/// Version id S3 reports for objects written while versioning is off or suspended.
pub const NULL_VERSION: &str = "null";
