//! Timestamps for retention, lifecycle and POST policy tests.

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Format used by POST policy expirations and retention dates.
pub const ISO8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Now plus `seconds`.
#[must_use]
pub fn time_to_add_seconds(seconds: i64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(seconds)
}

/// Now plus `minutes`, formatted as `yyyy-MM-ddTHH:mm:ssZ`.
#[must_use]
pub fn time_to_add_minutes(minutes: i64) -> String {
    (Utc::now() + Duration::minutes(minutes))
        .format(ISO8601_FORMAT)
        .to_string()
}

/// Expected lifecycle expiration `days` from now.
#[must_use]
pub fn expired_date(days: i64, is_aws: bool) -> DateTime<Utc> {
    expired_date_from(Utc::now(), days, is_aws)
}

/// Expected lifecycle expiration `days` after `instant`.
///
/// AWS rounds expirations up to the next midnight UTC.
#[must_use]
pub fn expired_date_from(instant: DateTime<Utc>, days: i64, is_aws: bool) -> DateTime<Utc> {
    if is_aws {
        let shifted = instant + Duration::days(days + 1);
        shifted.date_naive().and_time(NaiveTime::MIN).and_utc()
    } else {
        instant + Duration::days(days)
    }
}

/// Convert to the SDK timestamp type, truncating to whole seconds.
#[must_use]
pub fn to_sdk_datetime(time: DateTime<Utc>) -> aws_sdk_s3::primitives::DateTime {
    aws_sdk_s3::primitives::DateTime::from_secs(time.timestamp())
}
