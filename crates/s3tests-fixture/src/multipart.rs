//! Multipart upload bookkeeping and the upload/copy flows built on it.
//!
//! [`MultipartUploadData`] mirrors what the server should hold for an upload:
//! the id, one completed part per part number, the size of every part and the
//! concatenated body. Range checks later slice that body by byte offset.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    ChecksumType, CompletedMultipartUpload, CompletedPart, ServerSideEncryption,
};
use s3tests_core::constants::sizes::MB;
use s3tests_core::constants::sse;
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::bucket::copy_source;
use crate::checksums::{
    ChecksumAlgorithm, ChecksumError, ResponseChecksums, combine_crc, compute_composite_checksum,
    compute_content_md5,
};
use crate::compare::checksum_compare;
use crate::content::{ReadOptions, check_content_using_range};
use crate::data::{cut_string_data, random_text, split_ranges};
use crate::error::{FixtureError, FixtureResult, SdkResultExt, ensure_eq};

/// Part size used when none is given.
pub const DEFAULT_PART_SIZE: usize = 5 * MB;

/// Payload of [`multipart_upload_with_checksum`].
pub const CHECKSUM_UPLOAD_SIZE: usize = 10 * MB;

/// Content type set by [`multipart_upload_resend`].
pub const RESEND_CONTENT_TYPE: &str = "text/plain";

/// Local view of one multipart upload.
#[derive(Debug, Clone)]
pub struct MultipartUploadData {
    /// Upload id returned by `CreateMultipartUpload`.
    pub upload_id: String,
    /// Nominal part size.
    pub part_size: usize,
    body: String,
    parts: BTreeMap<i32, CompletedPart>,
    part_sizes: BTreeMap<i32, u64>,
}

impl Default for MultipartUploadData {
    fn default() -> Self {
        Self::new(String::new(), DEFAULT_PART_SIZE)
    }
}

impl MultipartUploadData {
    /// Empty bookkeeping for `upload_id`.
    #[must_use]
    pub fn new(upload_id: impl Into<String>, part_size: usize) -> Self {
        Self {
            upload_id: upload_id.into(),
            part_size: if part_size == 0 {
                DEFAULT_PART_SIZE
            } else {
                part_size
            },
            body: String::new(),
            parts: BTreeMap::new(),
            part_sizes: BTreeMap::new(),
        }
    }

    /// `parts.len() + 1`.
    #[must_use]
    pub fn next_part_number(&self) -> i32 {
        i32::try_from(self.parts.len() + 1).unwrap_or(i32::MAX)
    }

    /// Append uploaded text to the expected body.
    pub fn append_body(&mut self, data: &str) {
        self.body.push_str(data);
    }

    /// Expected object body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Record the next part.
    pub fn add_part(&mut self, e_tag: Option<&str>, size: u64) -> i32 {
        let part_number = self.next_part_number();
        self.add_part_number(part_number, e_tag, size);
        part_number
    }

    /// Record `part_number`, replacing an earlier upload of the same number.
    pub fn add_part_number(&mut self, part_number: i32, e_tag: Option<&str>, size: u64) {
        let part = CompletedPart::builder()
            .part_number(part_number)
            .set_e_tag(e_tag.map(str::to_owned))
            .build();
        self.insert(part, size);
    }

    /// Record `part_number` together with the checksum the server reported for `algorithm`.
    pub fn add_part_with_checksum(
        &mut self,
        part_number: i32,
        e_tag: Option<&str>,
        size: u64,
        algorithm: ChecksumAlgorithm,
        checksums: &ResponseChecksums,
    ) {
        let value = checksums.get(algorithm).map(str::to_owned);
        let builder = CompletedPart::builder()
            .part_number(part_number)
            .set_e_tag(e_tag.map(str::to_owned));
        let builder = match algorithm {
            ChecksumAlgorithm::Crc32 => builder.set_checksum_crc32(value),
            ChecksumAlgorithm::Crc32c => builder.set_checksum_crc32_c(value),
            ChecksumAlgorithm::Crc64Nvme => builder.set_checksum_crc64_nvme(value),
            ChecksumAlgorithm::Sha1 => builder.set_checksum_sha1(value),
            ChecksumAlgorithm::Sha256 => builder.set_checksum_sha256(value),
        };
        self.insert(builder.build(), size);
    }

    /// A resend of `part_number` keeps the recorded entry; its ETag must match
    /// the first upload of the same bytes.
    pub fn check_resent_part(&self, part_number: i32, e_tag: Option<&str>) -> FixtureResult<()> {
        let recorded = self
            .parts
            .get(&part_number)
            .ok_or(FixtureError::MissingField("PartNumber"))?;
        ensure_eq(
            &format!("part {part_number} ETag after resend"),
            recorded.e_tag(),
            e_tag,
        )
    }

    fn insert(&mut self, part: CompletedPart, size: u64) {
        let part_number = part.part_number().unwrap_or_default();
        self.parts.insert(part_number, part);
        self.part_sizes.insert(part_number, size);
    }

    /// Completed parts in ascending part number.
    #[must_use]
    pub fn parts(&self) -> Vec<CompletedPart> {
        self.parts.values().cloned().collect()
    }

    /// Part sizes in ascending part number.
    #[must_use]
    pub fn part_sizes(&self) -> Vec<u64> {
        self.part_sizes.values().copied().collect()
    }

    /// `CompleteMultipartUpload` payload.
    #[must_use]
    pub fn completed_multipart_upload(&self) -> CompletedMultipartUpload {
        CompletedMultipartUpload::builder()
            .set_parts(Some(self.parts()))
            .build()
    }

    /// Whole-object checksum the server should report once the upload completes.
    ///
    /// Composite uploads hash the decoded part checksums; full-object uploads
    /// combine the part CRCs. Every recorded part must carry a checksum.
    pub fn expected_checksum(
        &self,
        algorithm: ChecksumAlgorithm,
        checksum_type: &ChecksumType,
    ) -> Result<String, ChecksumError> {
        let values = self
            .parts
            .iter()
            .map(|(part_number, part)| {
                part_checksum(part, algorithm).map(str::to_owned).ok_or(
                    ChecksumError::MissingPart {
                        algorithm,
                        part_number: *part_number,
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        if *checksum_type == ChecksumType::FullObject {
            let pairs: Vec<(String, u64)> = values.into_iter().zip(self.part_sizes()).collect();
            combine_crc(algorithm, &pairs)
        } else {
            Ok(compute_composite_checksum(algorithm, &values))
        }
    }
}

fn part_checksum(part: &CompletedPart, algorithm: ChecksumAlgorithm) -> Option<&str> {
    match algorithm {
        ChecksumAlgorithm::Crc32 => part.checksum_crc32(),
        ChecksumAlgorithm::Crc32c => part.checksum_crc32_c(),
        ChecksumAlgorithm::Crc64Nvme => part.checksum_crc64_nvme(),
        ChecksumAlgorithm::Sha1 => part.checksum_sha1(),
        ChecksumAlgorithm::Sha256 => part.checksum_sha256(),
    }
}

/// Knobs of [`multipart_upload`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct MultipartOptions {
    /// Bytes per part; the last part holds the remainder.
    #[builder(default = DEFAULT_PART_SIZE)]
    pub part_size: usize,

    /// User metadata set on create.
    #[builder(default)]
    pub metadata: HashMap<String, String>,

    /// `Content-Type` set on create.
    #[builder(default, setter(into, strip_option))]
    pub content_type: Option<String>,

    /// Encrypt with the shared customer key; the client must use TLS.
    #[builder(default)]
    pub sse_c: bool,

    /// Request `AES256` server-side encryption.
    #[builder(default)]
    pub sse_s3: bool,

    /// Send `Content-MD5` with every part.
    #[builder(default)]
    pub content_md5: bool,

    /// Complete the upload after the last part.
    #[builder(default = true)]
    pub complete: bool,
}

impl Default for MultipartOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Create an upload, send `size` random bytes as parts and, unless
/// `options.complete` is off, complete it.
pub async fn multipart_upload(
    client: &Client,
    bucket: &str,
    key: &str,
    size: usize,
    options: &MultipartOptions,
) -> FixtureResult<MultipartUploadData> {
    let output = client
        .create_multipart_upload()
        .bucket(bucket)
        .key(key)
        .set_metadata((!options.metadata.is_empty()).then(|| options.metadata.clone()))
        .set_content_type(options.content_type.clone())
        .set_server_side_encryption(options.sse_s3.then_some(ServerSideEncryption::Aes256))
        .set_sse_customer_algorithm(options.sse_c.then(|| sse::ALGORITHM.to_owned()))
        .set_sse_customer_key(options.sse_c.then(|| sse::KEY.to_owned()))
        .set_sse_customer_key_md5(options.sse_c.then(|| sse::KEY_MD5.to_owned()))
        .send()
        .await
        .op("CreateMultipartUpload")?;
    let upload_id = output
        .upload_id()
        .ok_or(FixtureError::MissingField("UploadId"))?;
    debug!(%bucket, %key, %upload_id, size, part_size = options.part_size, "Multipart upload started");

    let mut data = MultipartUploadData::new(upload_id, options.part_size);
    upload_parts(client, bucket, key, size, options, &mut data).await?;
    if options.complete {
        complete_multipart_upload(client, bucket, key, &data).await?;
    }
    Ok(data)
}

/// Send `size` more random bytes as parts of an existing upload.
pub async fn upload_parts(
    client: &Client,
    bucket: &str,
    key: &str,
    size: usize,
    options: &MultipartOptions,
    data: &mut MultipartUploadData,
) -> FixtureResult<()> {
    for part in cut_string_data(&random_text(size), data.part_size) {
        data.append_body(&part);
        let part_number = data.next_part_number();
        let output = client
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(&data.upload_id)
            .part_number(part_number)
            .set_content_md5(options.content_md5.then(|| compute_content_md5(part.as_bytes())))
            .set_sse_customer_algorithm(options.sse_c.then(|| sse::ALGORITHM.to_owned()))
            .set_sse_customer_key(options.sse_c.then(|| sse::KEY.to_owned()))
            .set_sse_customer_key_md5(options.sse_c.then(|| sse::KEY_MD5.to_owned()))
            .body(ByteStream::from(part.clone().into_bytes()))
            .send()
            .await
            .op("UploadPart")?;
        data.add_part_number(part_number, output.e_tag(), part.len() as u64);
    }
    Ok(())
}

/// Complete `data` with its recorded parts.
pub async fn complete_multipart_upload(
    client: &Client,
    bucket: &str,
    key: &str,
    data: &MultipartUploadData,
) -> FixtureResult<()> {
    client
        .complete_multipart_upload()
        .bucket(bucket)
        .key(key)
        .upload_id(&data.upload_id)
        .multipart_upload(data.completed_multipart_upload())
        .send()
        .await
        .op("CompleteMultipartUpload")?;
    Ok(())
}

/// Upload 10 MB in 5 MB parts with `algorithm` checksums, checking each part's
/// checksum and the final object checksum.
pub async fn multipart_upload_with_checksum(
    client: &Client,
    bucket: &str,
    key: &str,
    algorithm: ChecksumAlgorithm,
    checksum_type: ChecksumType,
) -> FixtureResult<MultipartUploadData> {
    let output = client
        .create_multipart_upload()
        .bucket(bucket)
        .key(key)
        .checksum_type(checksum_type.clone())
        .checksum_algorithm(algorithm.into())
        .send()
        .await
        .op("CreateMultipartUpload")?;
    let upload_id = output
        .upload_id()
        .ok_or(FixtureError::MissingField("UploadId"))?;

    let mut data = MultipartUploadData::new(upload_id, DEFAULT_PART_SIZE);
    for part in cut_string_data(&random_text(CHECKSUM_UPLOAD_SIZE), data.part_size) {
        data.append_body(&part);
        let part_number = data.next_part_number();
        let output = client
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(&data.upload_id)
            .part_number(part_number)
            .checksum_algorithm(algorithm.into())
            .body(ByteStream::from(part.clone().into_bytes()))
            .send()
            .await
            .op("UploadPart")?;
        let checksums = ResponseChecksums::from(&output);
        checksum_compare(algorithm, part.as_bytes(), &checksums)?;
        data.add_part_with_checksum(
            part_number,
            output.e_tag(),
            part.len() as u64,
            algorithm,
            &checksums,
        );
    }

    let completed = client
        .complete_multipart_upload()
        .bucket(bucket)
        .key(key)
        .upload_id(&data.upload_id)
        .checksum_type(checksum_type.clone())
        .multipart_upload(data.completed_multipart_upload())
        .send()
        .await
        .op("CompleteMultipartUpload")?;

    let reported_type = completed.checksum_type().cloned().unwrap_or(checksum_type);
    let expected = data.expected_checksum(algorithm, &reported_type)?;
    ensure_eq(
        &format!("{algorithm} {} checksum", reported_type.as_str()),
        Some(expected.as_str()),
        ResponseChecksums::from(&completed).get(algorithm),
    )?;
    Ok(data)
}

/// Upload `size` bytes with metadata and `text/plain`, sending every part in
/// `resend_parts` twice. The first send's ETag is recorded and the resend must
/// echo it. The upload is left open.
pub async fn multipart_upload_resend(
    client: &Client,
    bucket: &str,
    key: &str,
    size: usize,
    metadata: HashMap<String, String>,
    resend_parts: &[i32],
) -> FixtureResult<MultipartUploadData> {
    let output = client
        .create_multipart_upload()
        .bucket(bucket)
        .key(key)
        .set_metadata(Some(metadata))
        .content_type(RESEND_CONTENT_TYPE)
        .send()
        .await
        .op("CreateMultipartUpload")?;
    let upload_id = output
        .upload_id()
        .ok_or(FixtureError::MissingField("UploadId"))?;

    let mut data = MultipartUploadData::new(upload_id, DEFAULT_PART_SIZE);
    for part in cut_string_data(&random_text(size), data.part_size) {
        data.append_body(&part);
        let part_number = data.next_part_number();
        let sends = if resend_parts.contains(&part_number) { 2 } else { 1 };
        for attempt in 0..sends {
            let output = client
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(&data.upload_id)
                .part_number(part_number)
                .body(ByteStream::from(part.clone().into_bytes()))
                .send()
                .await
                .op("UploadPart")?;
            if attempt == 0 {
                data.add_part_number(part_number, output.e_tag(), part.len() as u64);
            } else {
                data.check_resent_part(part_number, output.e_tag())?;
            }
        }
    }
    Ok(data)
}

/// Resend parts, complete, then verify metadata, content type and range reads.
pub async fn check_upload_multipart_resend(
    client: &Client,
    bucket: &str,
    key: &str,
    size: usize,
    resend_parts: &[i32],
) -> FixtureResult<()> {
    let metadata = HashMap::from([("foo".to_owned(), "bar".to_owned())]);
    let data =
        multipart_upload_resend(client, bucket, key, size, metadata.clone(), resend_parts).await?;
    complete_multipart_upload(client, bucket, key, &data).await?;

    let head = client
        .head_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .op("HeadObject")?;
    ensure_eq("metadata", Some(&metadata), head.metadata())?;
    ensure_eq("content type", Some(RESEND_CONTENT_TYPE), head.content_type())?;

    let read = ReadOptions::default();
    check_content_using_range(client, bucket, key, data.body(), MB, &read).await?;
    check_content_using_range(client, bucket, key, data.body(), 10 * MB, &read).await
}

/// `n` parts of 5 MB followed by a 1 MB part; the object must read back as
/// their concatenation, which is returned.
pub async fn do_test_multipart_upload_contents(
    client: &Client,
    bucket: &str,
    key: &str,
    n: usize,
) -> FixtureResult<String> {
    let payload = random_text(DEFAULT_PART_SIZE);
    let last = random_text(MB);
    let output = client
        .create_multipart_upload()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .op("CreateMultipartUpload")?;
    let upload_id = output
        .upload_id()
        .ok_or(FixtureError::MissingField("UploadId"))?;

    let mut data = MultipartUploadData::new(upload_id, DEFAULT_PART_SIZE);
    for body in std::iter::repeat_n(payload.as_str(), n).chain([last.as_str()]) {
        let part_number = data.next_part_number();
        let output = client
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(&data.upload_id)
            .part_number(part_number)
            .body(ByteStream::from(body.as_bytes().to_vec()))
            .send()
            .await
            .op("UploadPart")?;
        data.append_body(body);
        data.add_part_number(part_number, output.e_tag(), body.len() as u64);
    }
    complete_multipart_upload(client, bucket, key, &data).await?;

    let body = crate::bucket::get_body(client, bucket, key).await?;
    ensure_eq("multipart body length", data.body().len(), body.len())?;
    if body != data.body() {
        return Err(FixtureError::mismatch(
            s3tests_core::constants::NOT_MATCHED,
            "uploaded parts",
            "different content",
        ));
    }
    Ok(body)
}

/// Knobs of [`multipart_copy`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct MultipartCopyOptions {
    /// Bytes copied per part.
    #[builder(default = DEFAULT_PART_SIZE)]
    pub part_size: usize,

    /// Source version to copy.
    #[builder(default, setter(into, strip_option))]
    pub version_id: Option<String>,

    /// Source and target both use the shared customer key.
    #[builder(default)]
    pub sse_c: bool,

    /// User metadata set on the target.
    #[builder(default)]
    pub metadata: HashMap<String, String>,

    /// Record part checksums for `algorithm` and verify the final checksum on completion.
    #[builder(default, setter(strip_option))]
    pub checksum: Option<ChecksumAlgorithm>,

    /// Complete the upload after the last part.
    #[builder(default)]
    pub complete: bool,
}

impl Default for MultipartCopyOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Copy the first `size` bytes of a source object into a new multipart upload,
/// one `UploadPartCopy` per `bytes=start-end` range.
pub async fn multipart_copy(
    client: &Client,
    source_bucket: &str,
    source_key: &str,
    target_bucket: &str,
    target_key: &str,
    size: usize,
    options: &MultipartCopyOptions,
) -> FixtureResult<MultipartUploadData> {
    let sse_c = options.sse_c;
    let output = client
        .create_multipart_upload()
        .bucket(target_bucket)
        .key(target_key)
        .set_metadata((!options.metadata.is_empty()).then(|| options.metadata.clone()))
        .set_checksum_algorithm(options.checksum.map(Into::into))
        .set_sse_customer_algorithm(sse_c.then(|| sse::ALGORITHM.to_owned()))
        .set_sse_customer_key(sse_c.then(|| sse::KEY.to_owned()))
        .set_sse_customer_key_md5(sse_c.then(|| sse::KEY_MD5.to_owned()))
        .send()
        .await
        .op("CreateMultipartUpload")?;
    let upload_id = output
        .upload_id()
        .ok_or(FixtureError::MissingField("UploadId"))?;

    let source = copy_source(source_bucket, source_key, options.version_id.as_deref());
    let mut data = MultipartUploadData::new(upload_id, options.part_size);
    for range in split_ranges(size, data.part_size) {
        let part_number = data.next_part_number();
        let output = client
            .upload_part_copy()
            .bucket(target_bucket)
            .key(target_key)
            .upload_id(&data.upload_id)
            .part_number(part_number)
            .copy_source(&source)
            .copy_source_range(range.header())
            .set_copy_source_sse_customer_algorithm(sse_c.then(|| sse::ALGORITHM.to_owned()))
            .set_copy_source_sse_customer_key(sse_c.then(|| sse::KEY.to_owned()))
            .set_copy_source_sse_customer_key_md5(sse_c.then(|| sse::KEY_MD5.to_owned()))
            .set_sse_customer_algorithm(sse_c.then(|| sse::ALGORITHM.to_owned()))
            .set_sse_customer_key(sse_c.then(|| sse::KEY.to_owned()))
            .set_sse_customer_key_md5(sse_c.then(|| sse::KEY_MD5.to_owned()))
            .send()
            .await
            .op("UploadPartCopy")?;
        let result = output
            .copy_part_result()
            .ok_or(FixtureError::MissingField("CopyPartResult"))?;
        let len = range.len() as u64;
        match options.checksum {
            Some(algorithm) => data.add_part_with_checksum(
                part_number,
                result.e_tag(),
                len,
                algorithm,
                &ResponseChecksums::from(result),
            ),
            None => data.add_part_number(part_number, result.e_tag(), len),
        }
    }

    if options.complete {
        let completed = client
            .complete_multipart_upload()
            .bucket(target_bucket)
            .key(target_key)
            .upload_id(&data.upload_id)
            .multipart_upload(data.completed_multipart_upload())
            .send()
            .await
            .op("CompleteMultipartUpload")?;
        if let Some(algorithm) = options.checksum {
            let checksum_type = completed
                .checksum_type()
                .cloned()
                .unwrap_or(ChecksumType::Composite);
            let expected = data.expected_checksum(algorithm, &checksum_type)?;
            ensure_eq(
                &format!("{algorithm} copy checksum"),
                Some(expected.as_str()),
                ResponseChecksums::from(&completed).get(algorithm),
            )?;
        }
    }
    Ok(data)
}
