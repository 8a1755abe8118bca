//! `MetadataVerifier`: fetches a pool's off-chain metadata body and checks
//! its BLAKE2b-256 digest against the pool's declared hash.

use crate::errors::MetadataError;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use std::time::Duration;

/// Bodies are read up to this many bytes; anything beyond is silently
/// truncated before hashing, which means an oversized body will simply fail
/// the hash comparison rather than being rejected explicitly.
const MAX_METADATA_LEN: usize = 1024;
const FETCH_TIMEOUT: Duration = Duration::from_secs(1);

type Blake2b256 = Blake2b<U32>;

pub struct MetadataVerifier {
    client: reqwest::Client,
}

impl MetadataVerifier {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }

    /// Fetches `url`, hashes up to [`MAX_METADATA_LEN`] bytes of the body,
    /// and compares against `expected_hash` (lowercase hex).
    pub async fn verify(&self, url: &str, expected_hash: &str) -> Result<(), MetadataError> {
        let body = self.fetch_bounded(url).await?;

        let mut hasher = Blake2b256::new();
        hasher.update(&body);
        let actual = hex::encode(hasher.finalize());

        if actual.eq_ignore_ascii_case(expected_hash) {
            Ok(())
        } else {
            Err(MetadataError::HashMismatch { expected: expected_hash.to_string(), actual })
        }
    }

    async fn fetch_bounded(&self, url: &str) -> Result<Vec<u8>, MetadataError> {
        let response = self
            .client
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| MetadataError::Unreachable(Box::new(e)))?;

        // Legacy behavior: read the body regardless of status code. The read
        // itself stops at MAX_METADATA_LEN rather than buffering the whole
        // body and truncating after the fact.
        crate::http_util::read_bounded(response, MAX_METADATA_LEN)
            .await
            .map_err(|e| MetadataError::Unreachable(Box::new(e)))
    }
}

impl Default for MetadataVerifier {
    fn default() -> Self {
        Self::new()
    }
}
