//! Tag set builders.

use aws_sdk_s3::types::{Tag, Tagging};

use crate::data::random_text_mixed;
use crate::error::FixtureResult;

/// One tag.
pub fn tag(key: impl Into<String>, value: impl Into<String>) -> FixtureResult<Tag> {
    Ok(Tag::builder().key(key).value(value).build()?)
}

/// `n` tags whose key and value are both the index.
pub fn make_simple_tag_set(n: usize) -> FixtureResult<Vec<Tag>> {
    (0..n).map(|i| tag(i.to_string(), i.to_string())).collect()
}

/// `n` tags with random mixed-case keys and values of the given lengths.
pub fn make_detail_tag_set(n: usize, key_size: usize, value_size: usize) -> FixtureResult<Vec<Tag>> {
    (0..n)
        .map(|_| tag(random_text_mixed(key_size), random_text_mixed(value_size)))
        .collect()
}

/// Wrap a tag set for `PutObjectTagging`/`PutBucketTagging`.
pub fn tagging(tags: Vec<Tag>) -> FixtureResult<Tagging> {
    Ok(Tagging::builder().set_tag_set(Some(tags)).build()?)
}
