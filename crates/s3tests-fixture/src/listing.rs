//! Paged listing checks for `ListObjects` and `ListObjectsV2`.

use aws_sdk_s3::Client;
use aws_sdk_s3::types::{CommonPrefix, Object};
use typed_builder::TypedBuilder;

use crate::error::{FixtureResult, SdkResultExt, ensure_eq};

/// One `ListObjects`/`ListObjectsV2` page and what it must contain.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct ListExpectation {
    /// `prefix` request parameter.
    #[builder(default, setter(into, strip_option))]
    pub prefix: Option<String>,

    /// `delimiter` request parameter.
    #[builder(default, setter(into, strip_option))]
    pub delimiter: Option<String>,

    /// V1 `marker` or V2 `continuation-token`.
    #[builder(default, setter(into))]
    pub start: Option<String>,

    /// `max-keys` request parameter.
    #[builder(default, setter(strip_option))]
    pub max_keys: Option<i32>,

    /// Expected `IsTruncated`.
    #[builder(default)]
    pub is_truncated: bool,

    /// Expected keys, in listing order.
    #[builder(default, setter(transform = |keys: &[&str]| keys.iter().map(|k| (*k).to_owned()).collect()))]
    pub keys: Vec<String>,

    /// Expected common prefixes, in listing order.
    #[builder(default, setter(transform = |prefixes: &[&str]| prefixes.iter().map(|p| (*p).to_owned()).collect()))]
    pub prefixes: Vec<String>,
}

/// Issue one V1 listing, check it, and return its `NextMarker`.
pub async fn validate_list_object(
    client: &Client,
    bucket: &str,
    expect: &ListExpectation,
    next_marker: Option<&str>,
) -> FixtureResult<Option<String>> {
    let output = client
        .list_objects()
        .bucket(bucket)
        .set_prefix(expect.prefix.clone())
        .set_delimiter(expect.delimiter.clone())
        .set_marker(expect.start.clone())
        .set_max_keys(expect.max_keys)
        .send()
        .await
        .op("ListObjects")?;

    ensure_eq("IsTruncated", Some(expect.is_truncated), output.is_truncated())?;
    ensure_eq("NextMarker", next_marker, output.next_marker())?;
    check_page(expect, output.contents(), output.common_prefixes())?;
    Ok(output.next_marker().map(str::to_owned))
}

/// Issue one V2 listing, check it, and return its `NextContinuationToken`.
///
/// On the `last` page the token must be absent.
pub async fn validate_list_object_v2(
    client: &Client,
    bucket: &str,
    expect: &ListExpectation,
    last: bool,
) -> FixtureResult<Option<String>> {
    let output = client
        .list_objects_v2()
        .bucket(bucket)
        .set_prefix(expect.prefix.clone())
        .set_delimiter(expect.delimiter.clone())
        .set_continuation_token(expect.start.clone())
        .set_max_keys(expect.max_keys)
        .send()
        .await
        .op("ListObjectsV2")?;

    ensure_eq("IsTruncated", Some(expect.is_truncated), output.is_truncated())?;
    if last {
        ensure_eq("NextContinuationToken", None, output.next_continuation_token())?;
    }
    check_page(expect, output.contents(), output.common_prefixes())?;
    Ok(output.next_continuation_token().map(str::to_owned))
}

fn check_page(
    expect: &ListExpectation,
    contents: &[Object],
    common_prefixes: &[CommonPrefix],
) -> FixtureResult<()> {
    let keys: Vec<&str> = contents.iter().filter_map(Object::key).collect();
    let prefixes: Vec<&str> = common_prefixes
        .iter()
        .filter_map(CommonPrefix::prefix)
        .collect();
    let expected_keys: Vec<&str> = expect.keys.iter().map(String::as_str).collect();
    let expected_prefixes: Vec<&str> = expect.prefixes.iter().map(String::as_str).collect();
    ensure_eq("keys", expected_keys, keys)?;
    ensure_eq("common prefixes", expected_prefixes, prefixes)
}
