//! Content-addressed cache key generation.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::format::ImageFormat;

/// Compute a content-addressed cache key for an OG image variant.
///
/// The host is lowercased since `Host` headers are case-insensitive.
pub fn compute_cache_key(path: &str, host: &str, format: ImageFormat) -> String {
    let mut hasher = Sha256::new();
    hasher.update(host.to_ascii_lowercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(path.as_bytes());
    hasher.update(b"\n");
    hasher.update(format.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

/// Strong validator for an encoded image body, quoted for the `ETag` header.
pub fn content_etag(bytes: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(bytes)))
}

/// Fixed-length hex fingerprint identifying one cached image variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    hash: String,
    format: ImageFormat,
}

impl CacheKey {
    pub fn derive(path: &str, host: &str, format: ImageFormat) -> Self {
        Self { hash: compute_cache_key(path, host, format), format }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Format folded into the fingerprint.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Disk tier file name for this key in the given format.
    pub fn file_name(&self, format: ImageFormat) -> String {
        format!("{}_{}.{}", self.hash, format.as_str(), format.extension())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hash)
    }
}
