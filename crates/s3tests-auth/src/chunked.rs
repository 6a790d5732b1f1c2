//! `aws-chunked` streaming uploads signed with
//! `STREAMING-AWS4-HMAC-SHA256-PAYLOAD`.
//!
//! The header signature seeds a chain: every chunk is signed over the previous
//! chunk's signature, and the body ends with a signed zero-length chunk.
//!
//! ```text
//! <hex-size>;chunk-signature=<sig>\r\n
//! <data>\r\n
//! ...
//! 0;chunk-signature=<sig>\r\n
//! \r\n
//! ```

use crate::error::AuthError;
use crate::sigv4::{
    EMPTY_PAYLOAD_SHA256, STREAMING_PAYLOAD, SignableRequest, SignedRequest, SigningParams,
    compute_signature, hash_payload, sign_request,
};

/// Chunk size used when the caller has no preference (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

const CHUNK_STRING_TO_SIGN_PREFIX: &str = "AWS4-HMAC-SHA256-PAYLOAD";
const CHUNK_SIGNATURE_HEADER: &str = ";chunk-signature=";
const SIGNATURE_LENGTH: usize = 64;
const CRLF: &str = "\r\n";

/// Size of the framed body for `original_length` bytes split into `chunk_size` chunks.
///
/// # Examples
///
/// ```
/// use s3tests_auth::chunked::calculate_chunked_content_length;
///
/// assert_eq!(calculate_chunked_content_length(66_560, 65_536), 66_824);
/// ```
#[must_use]
pub fn calculate_chunked_content_length(original_length: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return framed_chunk_length(0);
    }
    let full_chunks = original_length / chunk_size;
    let remainder = original_length % chunk_size;
    let mut total = full_chunks * framed_chunk_length(chunk_size);
    if remainder > 0 {
        total += framed_chunk_length(remainder);
    }
    total + framed_chunk_length(0)
}

fn framed_chunk_length(data_length: usize) -> usize {
    format!("{data_length:x}").len()
        + CHUNK_SIGNATURE_HEADER.len()
        + SIGNATURE_LENGTH
        + CRLF.len()
        + data_length
        + CRLF.len()
}

/// Rolling per-chunk signer.
#[derive(Debug, Clone)]
pub struct ChunkSigner {
    signing_key: Vec<u8>,
    amz_date: String,
    scope: String,
    previous_signature: String,
}

impl ChunkSigner {
    /// Start a chain from the request's seed signature.
    #[must_use]
    pub fn new(params: &SigningParams<'_>, seed_signature: impl Into<String>) -> Self {
        Self {
            signing_key: params.signing_key(),
            amz_date: params.amz_date(),
            scope: params.scope(),
            previous_signature: seed_signature.into(),
        }
    }

    /// Sign the next chunk and advance the chain.
    pub fn sign_chunk(&mut self, chunk: &[u8]) -> String {
        let string_to_sign = format!(
            "{CHUNK_STRING_TO_SIGN_PREFIX}\n{}\n{}\n{}\n{EMPTY_PAYLOAD_SHA256}\n{}",
            self.amz_date,
            self.scope,
            self.previous_signature,
            hash_payload(chunk),
        );
        let signature = compute_signature(&self.signing_key, &string_to_sign);
        self.previous_signature.clone_from(&signature);
        signature
    }

    /// Sign and frame one chunk.
    pub fn encode_chunk(&mut self, chunk: &[u8]) -> Vec<u8> {
        let signature = self.sign_chunk(chunk);
        let mut out = Vec::with_capacity(framed_chunk_length(chunk.len()));
        out.extend_from_slice(format!("{:x}{CHUNK_SIGNATURE_HEADER}{signature}{CRLF}", chunk.len()).as_bytes());
        out.extend_from_slice(chunk);
        out.extend_from_slice(CRLF.as_bytes());
        out
    }

    /// Frame a whole body, including the terminating empty chunk.
    pub fn encode_body(&mut self, body: &[u8], chunk_size: usize) -> Result<Vec<u8>, AuthError> {
        if chunk_size == 0 {
            return Err(AuthError::InvalidChunkSize);
        }
        let mut out = Vec::with_capacity(calculate_chunked_content_length(body.len(), chunk_size));
        for chunk in body.chunks(chunk_size) {
            out.extend(self.encode_chunk(chunk));
        }
        out.extend(self.encode_chunk(&[]));
        Ok(out)
    }
}

/// Sign the headers of a streaming upload and frame its body.
///
/// Adds `content-encoding`, `content-length` and `x-amz-decoded-content-length`
/// to the signed headers.
pub fn sign_chunked_request(
    request: SignableRequest,
    params: &SigningParams<'_>,
    body: &[u8],
    chunk_size: usize,
) -> Result<(SignedRequest, Vec<u8>), AuthError> {
    if chunk_size == 0 {
        return Err(AuthError::InvalidChunkSize);
    }
    let request = request
        .header("content-encoding", "aws-chunked")
        .header(
            "content-length",
            calculate_chunked_content_length(body.len(), chunk_size).to_string(),
        )
        .header("x-amz-decoded-content-length", body.len().to_string())
        .payload_hash(STREAMING_PAYLOAD);

    let signed = sign_request(&request, params);
    let mut signer = ChunkSigner::new(params, signed.signature.clone());
    let framed = signer.encode_body(body, chunk_size)?;
    Ok((signed, framed))
}
