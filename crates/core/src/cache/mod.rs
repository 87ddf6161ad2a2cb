//! Two-tier cache for rendered OG images.
//!
//! This module provides a content-addressed image cache with two tiers:
//!
//! - A process-wide memory tier with a short TTL, absorbing bursts of
//!   repeated requests without touching the filesystem
//! - A disk tier with a long TTL that survives restarts, one encoded image
//!   per file named `<fingerprint>_<format>.<extension>`
//!
//! Keys are SHA-256 fingerprints of `(host, path, format)`.

pub mod hash;
pub mod store;

pub use hash::{CacheKey, compute_cache_key, content_etag};
pub use store::{CacheEntry, CacheHit, CacheSettings, Tier, TwoTierCache};
