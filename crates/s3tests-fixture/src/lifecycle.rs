//! Lifecycle rule setup.

use aws_sdk_s3::Client;
use aws_sdk_s3::types::{
    BucketLifecycleConfiguration, ExpirationStatus, LifecycleExpiration, LifecycleRule,
    LifecycleRuleFilter,
};

use crate::bucket::create_objects_in;
use crate::error::{FixtureResult, SdkResultExt};

/// Enabled rule expiring objects under `prefix` after `days`.
pub fn expiration_rule(rule_id: &str, days: i32, prefix: &str) -> FixtureResult<LifecycleRule> {
    Ok(LifecycleRule::builder()
        .id(rule_id)
        .filter(LifecycleRuleFilter::builder().prefix(prefix).build())
        .status(ExpirationStatus::Enabled)
        .expiration(LifecycleExpiration::builder().days(days).build())
        .build()?)
}

/// Install a single expiration rule, write `{prefix}/foo`, and return the
/// rules the server reports back.
pub async fn setup_lifecycle_expiration(
    client: &Client,
    bucket: &str,
    rule_id: &str,
    days: i32,
    prefix: &str,
) -> FixtureResult<Vec<LifecycleRule>> {
    let configuration = BucketLifecycleConfiguration::builder()
        .rules(expiration_rule(rule_id, days, prefix)?)
        .build()?;
    client
        .put_bucket_lifecycle_configuration()
        .bucket(bucket)
        .lifecycle_configuration(configuration)
        .send()
        .await
        .op("PutBucketLifecycleConfiguration")?;

    let key = format!("{prefix}/foo");
    create_objects_in(client, bucket, &[key.as_str()]).await?;

    let output = client
        .get_bucket_lifecycle_configuration()
        .bucket(bucket)
        .send()
        .await
        .op("GetBucketLifecycleConfiguration")?;
    Ok(output.rules().to_vec())
}
