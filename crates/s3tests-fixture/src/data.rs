//! Random payloads and byte-range arithmetic.

use rand::RngExt;

const LOWER_ALNUM: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const MIXED_ALNUM: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random lowercase alphanumeric text, valid in bucket names.
#[must_use]
pub fn random_text(len: usize) -> String {
    sample(LOWER_ALNUM, len)
}

/// Random mixed-case alphanumeric text.
#[must_use]
pub fn random_text_mixed(len: usize) -> String {
    sample(MIXED_ALNUM, len)
}

fn sample(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(alphabet[rng.random_range(0..alphabet.len())]))
        .collect()
}

/// Uniform integer in `0..bound`; `0` when `bound` is zero.
#[must_use]
pub fn random_below(bound: usize) -> usize {
    if bound == 0 {
        return 0;
    }
    rand::rng().random_range(0..bound)
}

/// Split text into consecutive slices of at most `part_size` bytes.
#[must_use]
pub fn cut_string_data(data: &str, part_size: usize) -> Vec<String> {
    if part_size == 0 || data.is_empty() {
        return vec![data.to_owned()];
    }
    data.as_bytes()
        .chunks(part_size)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect()
}

/// An inclusive byte range, as sent in a `Range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset.
    pub start: usize,
    /// Last byte offset, inclusive.
    pub end: usize,
}

impl ByteRange {
    /// Range header value, `bytes=start-end`.
    #[must_use]
    pub fn header(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }

    /// Number of bytes covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    /// Always false; a range covers at least one byte.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The covered slice of `data`.
    #[must_use]
    pub fn slice<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.start..=self.end]
    }
}

/// Consecutive ranges of `step` bytes covering `0..size`.
///
/// The final range ends at `size - 1`.
#[must_use]
pub fn split_ranges(size: usize, step: usize) -> Vec<ByteRange> {
    if size == 0 || step == 0 {
        return Vec::new();
    }
    (0..size)
        .step_by(step)
        .map(|start| ByteRange {
            start,
            end: (start + step).min(size) - 1,
        })
        .collect()
}

/// A random range inside an object of `size` bytes, at most `max` long.
///
/// The start lies in `0..size-1` and the length in `1..=min(max, size-start)`.
#[must_use]
pub fn get_random_range(size: usize, max: usize) -> ByteRange {
    let start = random_below(size.saturating_sub(1));
    let remaining = size.saturating_sub(start).max(1);
    let length = 1 + random_below(max.min(remaining).max(1));
    ByteRange {
        start,
        end: start + length - 1,
    }
}
