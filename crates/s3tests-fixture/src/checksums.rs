//! Client-side checksums used to predict what the server should report.
//!
//! Covers the MD5 ETag/`Content-MD5` values and the additional algorithms of
//! the `x-amz-checksum-*` headers, plus the two multipart forms:
//!
//! - **composite**: checksum of the concatenated raw part checksums, suffixed
//!   with `-<part count>`;
//! - **full object**: the CRC of the whole body, derived from the part CRCs
//!   with the GF(2) matrix combination used by zlib's `crc32_combine`.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use sha2::Digest;

// ---------------------------------------------------------------------------
// ChecksumAlgorithm
// ---------------------------------------------------------------------------

/// Additional checksum algorithms accepted by S3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    /// CRC-32 (IEEE 802.3).
    Crc32,
    /// CRC-32C (Castagnoli).
    Crc32c,
    /// CRC-64/NVME.
    Crc64Nvme,
    /// SHA-1.
    Sha1,
    /// SHA-256.
    Sha256,
}

impl ChecksumAlgorithm {
    /// Every algorithm, in header order.
    pub const ALL: [Self; 5] = [
        Self::Crc32,
        Self::Crc32c,
        Self::Crc64Nvme,
        Self::Sha1,
        Self::Sha256,
    ];

    /// Name used in `x-amz-checksum-algorithm`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crc32 => "CRC32",
            Self::Crc32c => "CRC32C",
            Self::Crc64Nvme => "CRC64NVME",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
        }
    }

    /// Whether full-object checksums can be derived from part checksums.
    #[must_use]
    pub fn is_crc(&self) -> bool {
        matches!(self, Self::Crc32 | Self::Crc32c | Self::Crc64Nvme)
    }

    /// `x-amz-checksum-*` header carrying this algorithm's value.
    #[must_use]
    pub fn header_name(&self) -> String {
        format!("x-amz-checksum-{}", self.as_str().to_ascii_lowercase())
    }

    /// `(reflected polynomial, width in bits)` for CRC algorithms.
    fn crc_params(self) -> Option<(u64, usize)> {
        match self {
            Self::Crc32 => Some((0xEDB8_8320, 32)),
            Self::Crc32c => Some((0x82F6_3B78, 32)),
            Self::Crc64Nvme => Some((0x9A6C_9329_AC4B_C9B5, 64)),
            Self::Sha1 | Self::Sha256 => None,
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CRC32" => Ok(Self::Crc32),
            "CRC32C" => Ok(Self::Crc32c),
            "CRC64NVME" => Ok(Self::Crc64Nvme),
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            _ => Err(ChecksumError::UnknownAlgorithm(s.to_owned())),
        }
    }
}

impl From<ChecksumAlgorithm> for aws_sdk_s3::types::ChecksumAlgorithm {
    fn from(algorithm: ChecksumAlgorithm) -> Self {
        match algorithm {
            ChecksumAlgorithm::Crc32 => Self::Crc32,
            ChecksumAlgorithm::Crc32c => Self::Crc32C,
            ChecksumAlgorithm::Crc64Nvme => Self::Crc64Nvme,
            ChecksumAlgorithm::Sha1 => Self::Sha1,
            ChecksumAlgorithm::Sha256 => Self::Sha256,
        }
    }
}

/// Errors from checksum parsing and combination.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChecksumError {
    /// Unrecognized algorithm name.
    #[error("unknown checksum algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Full-object combination requested for a digest algorithm.
    #[error("{0} checksums cannot be combined")]
    NotCombinable(ChecksumAlgorithm),

    /// A checksum value was not base64 of the algorithm's width.
    #[error("invalid {algorithm} checksum value: {value}")]
    InvalidValue {
        /// Algorithm the value claims to be.
        algorithm: ChecksumAlgorithm,
        /// The offending value.
        value: String,
    },

    /// A part carries no checksum for the algorithm being combined.
    #[error("part {part_number} has no {algorithm} checksum")]
    MissingPart {
        /// Algorithm being combined.
        algorithm: ChecksumAlgorithm,
        /// Part without a value.
        part_number: i32,
    },
}

// ---------------------------------------------------------------------------
// Standalone checksum functions
// ---------------------------------------------------------------------------

/// Hex MD5 of `data`, the single-part ETag without quotes.
///
/// # Examples
///
/// ```
/// use s3tests_fixture::checksums::compute_md5;
///
/// assert_eq!(compute_md5(b"hello"), "5d41402abc4b2a76b9719d911017c592");
/// ```
#[must_use]
pub fn compute_md5(data: &[u8]) -> String {
    hex::encode(md5::Md5::digest(data))
}

/// Base64 MD5 of `data`, the `Content-MD5` header value.
#[must_use]
pub fn compute_content_md5(data: &[u8]) -> String {
    BASE64_STANDARD.encode(md5::Md5::digest(data))
}

/// Base64 checksum of `data`: big-endian CRC bytes or the raw digest.
///
/// # Examples
///
/// ```
/// use s3tests_fixture::checksums::{ChecksumAlgorithm, compute_checksum};
///
/// assert_eq!(compute_checksum(ChecksumAlgorithm::Crc32, b"hello"), "NhCmhg==");
/// ```
#[must_use]
pub fn compute_checksum(algorithm: ChecksumAlgorithm, data: &[u8]) -> String {
    match algorithm {
        ChecksumAlgorithm::Crc32 => {
            let mut hasher = crc32fast::Hasher::new();
            hasher.update(data);
            BASE64_STANDARD.encode(hasher.finalize().to_be_bytes())
        }
        ChecksumAlgorithm::Crc32c => BASE64_STANDARD.encode(crc32c::crc32c(data).to_be_bytes()),
        ChecksumAlgorithm::Crc64Nvme => {
            let mut digest = crc64fast_nvme::Digest::new();
            digest.write(data);
            BASE64_STANDARD.encode(digest.sum64().to_be_bytes())
        }
        ChecksumAlgorithm::Sha1 => BASE64_STANDARD.encode(sha1::Sha1::digest(data)),
        ChecksumAlgorithm::Sha256 => BASE64_STANDARD.encode(sha2::Sha256::digest(data)),
    }
}

/// Multipart ETag: MD5 of the concatenated binary part MD5s, `"<hex>-<n>"`.
#[must_use]
pub fn compute_multipart_etag(part_etags: &[impl AsRef<str>]) -> String {
    let mut combined = Vec::with_capacity(part_etags.len() * 16);
    for etag in part_etags {
        if let Ok(bytes) = hex::decode(etag.as_ref().trim_matches('"')) {
            combined.extend_from_slice(&bytes);
        }
    }
    format!(
        "\"{}-{}\"",
        hex::encode(md5::Md5::digest(&combined)),
        part_etags.len()
    )
}

/// Composite multipart checksum: `checksum(concat(decoded parts))-<n>`.
#[must_use]
pub fn compute_composite_checksum(
    algorithm: ChecksumAlgorithm,
    part_checksums_b64: &[impl AsRef<str>],
) -> String {
    let mut combined = Vec::new();
    for b64 in part_checksums_b64 {
        if let Ok(bytes) = BASE64_STANDARD.decode(b64.as_ref()) {
            combined.extend_from_slice(&bytes);
        }
    }
    format!(
        "{}-{}",
        compute_checksum(algorithm, &combined),
        part_checksums_b64.len()
    )
}

/// Full-object CRC derived from `(base64 part CRC, part length)` pairs.
pub fn combine_crc(
    algorithm: ChecksumAlgorithm,
    parts: &[(impl AsRef<str>, u64)],
) -> Result<String, ChecksumError> {
    let (poly, width) = algorithm
        .crc_params()
        .ok_or(ChecksumError::NotCombinable(algorithm))?;

    let mut combined: Option<u64> = None;
    for (b64, len) in parts {
        let value = decode_crc(algorithm, b64.as_ref(), width)?;
        combined = Some(match combined {
            None => value,
            Some(previous) => crc_combine(previous, value, *len, poly, width),
        });
    }
    let crc = combined.unwrap_or(0);

    Ok(if width == 32 {
        BASE64_STANDARD.encode((crc as u32).to_be_bytes())
    } else {
        BASE64_STANDARD.encode(crc.to_be_bytes())
    })
}

fn decode_crc(algorithm: ChecksumAlgorithm, b64: &str, width: usize) -> Result<u64, ChecksumError> {
    let invalid = || ChecksumError::InvalidValue {
        algorithm,
        value: b64.to_owned(),
    };
    let bytes = BASE64_STANDARD.decode(b64).map_err(|_| invalid())?;
    if bytes.len() * 8 != width {
        return Err(invalid());
    }
    Ok(bytes
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
}

// ---------------------------------------------------------------------------
// GF(2) CRC combination
// ---------------------------------------------------------------------------

fn gf2_matrix_times(matrix: &[u64], mut vector: u64) -> u64 {
    let mut sum = 0;
    let mut row = 0;
    while vector != 0 {
        if vector & 1 != 0 {
            sum ^= matrix[row];
        }
        vector >>= 1;
        row += 1;
    }
    sum
}

fn gf2_matrix_square(square: &mut [u64], matrix: &[u64]) {
    for (n, slot) in square.iter_mut().enumerate() {
        *slot = gf2_matrix_times(matrix, matrix[n]);
    }
}

/// CRC of `A || B` from `crc(A)`, `crc(B)` and `len(B)`.
fn crc_combine(crc1: u64, crc2: u64, len2: u64, poly: u64, width: usize) -> u64 {
    if len2 == 0 {
        return crc1;
    }

    let mut even = vec![0u64; width];
    let mut odd = vec![0u64; width];

    // Operator for a single zero bit.
    odd[0] = poly;
    let mut row = 1u64;
    for slot in odd.iter_mut().skip(1) {
        *slot = row;
        row <<= 1;
    }

    // Two zero bits, then four.
    gf2_matrix_square(&mut even, &odd);
    gf2_matrix_square(&mut odd, &even);

    let mut crc1 = crc1;
    let mut len2 = len2;
    loop {
        gf2_matrix_square(&mut even, &odd);
        if len2 & 1 != 0 {
            crc1 = gf2_matrix_times(&even, crc1);
        }
        len2 >>= 1;
        if len2 == 0 {
            break;
        }

        gf2_matrix_square(&mut odd, &even);
        if len2 & 1 != 0 {
            crc1 = gf2_matrix_times(&odd, crc1);
        }
        len2 >>= 1;
        if len2 == 0 {
            break;
        }
    }

    crc1 ^ crc2
}

// ---------------------------------------------------------------------------
// ResponseChecksums
// ---------------------------------------------------------------------------

/// Checksum fields reported by a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseChecksums {
    /// `x-amz-checksum-crc32`.
    pub crc32: Option<String>,
    /// `x-amz-checksum-crc32c`.
    pub crc32c: Option<String>,
    /// `x-amz-checksum-crc64nvme`.
    pub crc64nvme: Option<String>,
    /// `x-amz-checksum-sha1`.
    pub sha1: Option<String>,
    /// `x-amz-checksum-sha256`.
    pub sha256: Option<String>,
    /// `x-amz-checksum-type`, when the operation reports one.
    pub checksum_type: Option<String>,
}

impl ResponseChecksums {
    /// Value reported for `algorithm`.
    #[must_use]
    pub fn get(&self, algorithm: ChecksumAlgorithm) -> Option<&str> {
        match algorithm {
            ChecksumAlgorithm::Crc32 => self.crc32.as_deref(),
            ChecksumAlgorithm::Crc32c => self.crc32c.as_deref(),
            ChecksumAlgorithm::Crc64Nvme => self.crc64nvme.as_deref(),
            ChecksumAlgorithm::Sha1 => self.sha1.as_deref(),
            ChecksumAlgorithm::Sha256 => self.sha256.as_deref(),
        }
    }
}

macro_rules! response_checksums {
    ($output:ty) => {
        impl From<&$output> for ResponseChecksums {
            fn from(output: &$output) -> Self {
                Self {
                    crc32: output.checksum_crc32().map(str::to_owned),
                    crc32c: output.checksum_crc32_c().map(str::to_owned),
                    crc64nvme: output.checksum_crc64_nvme().map(str::to_owned),
                    sha1: output.checksum_sha1().map(str::to_owned),
                    sha256: output.checksum_sha256().map(str::to_owned),
                    checksum_type: None,
                }
            }
        }
    };
    ($output:ty, typed) => {
        impl From<&$output> for ResponseChecksums {
            fn from(output: &$output) -> Self {
                Self {
                    crc32: output.checksum_crc32().map(str::to_owned),
                    crc32c: output.checksum_crc32_c().map(str::to_owned),
                    crc64nvme: output.checksum_crc64_nvme().map(str::to_owned),
                    sha1: output.checksum_sha1().map(str::to_owned),
                    sha256: output.checksum_sha256().map(str::to_owned),
                    checksum_type: output.checksum_type().map(|t| t.as_str().to_owned()),
                }
            }
        }
    };
}

response_checksums!(aws_sdk_s3::operation::put_object::PutObjectOutput, typed);
response_checksums!(aws_sdk_s3::operation::get_object::GetObjectOutput, typed);
response_checksums!(aws_sdk_s3::operation::head_object::HeadObjectOutput, typed);
response_checksums!(aws_sdk_s3::operation::upload_part::UploadPartOutput);
response_checksums!(
    aws_sdk_s3::operation::complete_multipart_upload::CompleteMultipartUploadOutput,
    typed
);
response_checksums!(aws_sdk_s3::types::CopyObjectResult, typed);
response_checksums!(aws_sdk_s3::types::CopyPartResult);
