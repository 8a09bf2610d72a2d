//! Digest calculation and verification for downloaded artifacts.
//!
//! Artifacts are verified either against checksums declared by the caller
//! or against `.md5`/`.sha1`/`.sha256`/`.sha512` sidecar files published
//! next to the artifact in the repository.

use std::fmt;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use url::Url;

use crate::http::{FetchError, HttpClient};

/// Digest algorithms understood by the verification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumAlgo {
    /// MD5 (legacy, still published by most repositories).
    Md5,
    /// SHA-1 (the historical Maven default).
    Sha1,
    /// SHA-256.
    Sha256,
    /// SHA-512.
    Sha512,
}

impl ChecksumAlgo {
    /// Sidecar probing order: strongest first.
    pub const REMOTE_ORDER: [ChecksumAlgo; 4] = [
        ChecksumAlgo::Sha512,
        ChecksumAlgo::Sha256,
        ChecksumAlgo::Sha1,
        ChecksumAlgo::Md5,
    ];

    /// The sidecar file extension for this algorithm.
    pub fn extension(self) -> &'static str {
        match self {
            ChecksumAlgo::Md5 => "md5",
            ChecksumAlgo::Sha1 => "sha1",
            ChecksumAlgo::Sha256 => "sha256",
            ChecksumAlgo::Sha512 => "sha512",
        }
    }

    /// Calculate the lowercase hex digest of `bytes` under this algorithm.
    pub fn hex_digest(self, bytes: &[u8]) -> String {
        match self {
            ChecksumAlgo::Md5 => format!("{:x}", Md5::digest(bytes)),
            ChecksumAlgo::Sha1 => format!("{:x}", Sha1::digest(bytes)),
            ChecksumAlgo::Sha256 => format!("{:x}", Sha256::digest(bytes)),
            ChecksumAlgo::Sha512 => format!("{:x}", Sha512::digest(bytes)),
        }
    }
}

impl fmt::Display for ChecksumAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChecksumAlgo::Md5 => "MD5",
            ChecksumAlgo::Sha1 => "SHA-1",
            ChecksumAlgo::Sha256 => "SHA-256",
            ChecksumAlgo::Sha512 => "SHA-512",
        };
        f.write_str(name)
    }
}

/// An expected digest for an artifact under a named algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactChecksum {
    algo: ChecksumAlgo,
    digest: String,
}

impl ArtifactChecksum {
    /// Create a checksum expectation. The digest is normalized to
    /// lowercase so comparisons are case-insensitive.
    pub fn new(algo: ChecksumAlgo, digest: impl Into<String>) -> Self {
        Self {
            algo,
            digest: digest.into().to_ascii_lowercase(),
        }
    }

    /// The digest algorithm.
    pub fn algo(&self) -> ChecksumAlgo {
        self.algo
    }

    /// The expected lowercase hex digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Whether `bytes` hash to the expected digest.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        self.algo.hex_digest(bytes) == self.digest
    }
}

impl fmt::Display for ArtifactChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algo, self.digest)
    }
}

/// The sidecar URL for an artifact URL: `<artifact-url>.<algo-extension>`.
pub fn sidecar_url(artifact_url: &Url, algo: ChecksumAlgo) -> Result<Url, url::ParseError> {
    Url::parse(&format!("{}.{}", artifact_url, algo.extension()))
}

/// Fetch the published checksum for `artifact_url` under `algo`.
///
/// Returns `Ok(None)` when the repository does not publish a sidecar for
/// this algorithm (404). Network failures are reported so the caller can
/// fail the download rather than silently skip verification.
pub async fn fetch_remote(
    http: &dyn HttpClient,
    artifact_url: &Url,
    algo: ChecksumAlgo,
) -> Result<Option<ArtifactChecksum>, FetchError> {
    let url = sidecar_url(artifact_url, algo)
        .map_err(|e| FetchError::Transport(format!("invalid sidecar URL: {e}")))?;

    match http.get(&url).await {
        Ok(bytes) => {
            // Sidecars are a hex digest with optional trailing whitespace.
            let digest = String::from_utf8_lossy(&bytes).trim().to_string();
            Ok(Some(ArtifactChecksum::new(algo, digest)))
        }
        Err(FetchError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}
