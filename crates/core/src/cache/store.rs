//! Memory + disk tiers for encoded OG images.
//!
//! Memory entries are evicted logically: a read that finds a stale or empty
//! entry drops it and falls through to disk. Disk entries are judged by file
//! modification time and are promoted into memory when accepted. Writes are
//! best-effort on disk and unconditional in memory.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use tokio::sync::RwLock;

use super::hash::CacheKey;
use crate::config::OgCacheConfig;
use crate::format::ImageFormat;

/// Suffix counter keeping concurrent temp files for the same key apart.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Cache location and lifetimes, resolved once at startup.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub dir: PathBuf,
    pub memory_ttl: Duration,
    pub disk_ttl: Duration,
}

impl CacheSettings {
    pub fn from_config(config: &OgCacheConfig) -> Self {
        Self { dir: config.dir.clone(), memory_ttl: config.memory_ttl(), disk_ttl: config.disk_ttl() }
    }
}

/// Which tier served a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Memory,
    Disk,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Memory => "memory",
            Tier::Disk => "disk",
        }
    }
}

/// Cached image buffer with its write timestamp.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub buffer: Bytes,
    pub format: ImageFormat,
    pub written_at: SystemTime,
}

impl CacheEntry {
    /// Non-empty and younger than `ttl` at `now`.
    fn is_fresh(&self, ttl: Duration, now: SystemTime) -> bool {
        !self.buffer.is_empty() && age(self.written_at, now) < ttl
    }
}

/// A cache hit, tagged with the tier that produced it.
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub buffer: Bytes,
    pub format: ImageFormat,
    pub tier: Tier,
}

fn age(written_at: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(written_at).unwrap_or(Duration::ZERO)
}

/// Two-tier OG image cache.
///
/// Constructed once per process and shared by reference. The memory tier is
/// unbounded; entries leave it by TTL only.
#[derive(Debug)]
pub struct TwoTierCache {
    settings: CacheSettings,
    memory: RwLock<HashMap<String, CacheEntry>>,
}

impl TwoTierCache {
    pub fn new(settings: CacheSettings) -> Self {
        tracing::info!(
            dir = %settings.dir.display(),
            memory_ttl_secs = settings.memory_ttl.as_secs(),
            disk_ttl_secs = settings.disk_ttl.as_secs(),
            "OG image cache initialized"
        );
        Self { settings, memory: RwLock::new(HashMap::new()) }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Look up a key, returning the stored image bytes.
    ///
    /// Zero-length entries are never returned.
    pub async fn get(&self, key: &CacheKey) -> Option<Bytes> {
        self.lookup(key).await.map(|hit| hit.buffer)
    }

    /// Look up a key, reporting which tier answered.
    pub async fn lookup(&self, key: &CacheKey) -> Option<CacheHit> {
        self.lookup_at(key, SystemTime::now()).await
    }

    async fn lookup_at(&self, key: &CacheKey, now: SystemTime) -> Option<CacheHit> {
        {
            let memory = self.memory.read().await;
            if let Some(entry) = memory.get(key.as_str())
                && entry.is_fresh(self.settings.memory_ttl, now)
            {
                tracing::debug!(key = %key, tier = "memory", "OG cache hit");
                return Some(CacheHit { buffer: entry.buffer.clone(), format: entry.format, tier: Tier::Memory });
            }
        }

        self.evict_if_stale(key, now).await;

        let (buffer, format) = self.read_disk(key, now).await?;
        tracing::debug!(key = %key, tier = "disk", bytes = buffer.len(), "OG cache hit");

        self.memory
            .write()
            .await
            .insert(key.as_str().to_string(), CacheEntry { buffer: buffer.clone(), format, written_at: now });

        Some(CacheHit { buffer, format, tier: Tier::Disk })
    }

    async fn evict_if_stale(&self, key: &CacheKey, now: SystemTime) {
        let mut memory = self.memory.write().await;
        if let Some(entry) = memory.get(key.as_str())
            && !entry.is_fresh(self.settings.memory_ttl, now)
        {
            memory.remove(key.as_str());
        }
    }

    /// Read the key's own `<hash>_<format>.<ext>` file if it is fresh and non-empty.
    async fn read_disk(&self, key: &CacheKey, now: SystemTime) -> Option<(Bytes, ImageFormat)> {
        let format = key.format();
        let path = self.settings.dir.join(key.file_name(format));

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to stat cache file");
                return None;
            }
        };

        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cache file has no modification time");
                return None;
            }
        };

        if age(modified, now) >= self.settings.disk_ttl || metadata.len() == 0 {
            return None;
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => Some((Bytes::from(bytes), format)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read cache file");
                None
            }
        }
    }

    /// Store an encoded image in both tiers.
    ///
    /// Disk failures are logged and swallowed; the memory tier is refreshed
    /// regardless. Empty buffers are not stored.
    pub async fn put(&self, key: &CacheKey, buffer: Bytes, format: ImageFormat) {
        if buffer.is_empty() {
            tracing::warn!(key = %key, "refusing to cache empty image buffer");
            return;
        }

        match self.write_disk(key, &buffer, format).await {
            Ok(path) => tracing::debug!(key = %key, path = %path.display(), bytes = buffer.len(), "OG image persisted"),
            Err(e) => tracing::warn!(key = %key, error = %e, "failed to persist OG image to disk cache"),
        }

        self.memory
            .write()
            .await
            .insert(key.as_str().to_string(), CacheEntry { buffer, format, written_at: SystemTime::now() });
    }

    /// Write via a temp file and rename so readers never see a partial image.
    async fn write_disk(&self, key: &CacheKey, buffer: &[u8], format: ImageFormat) -> io::Result<PathBuf> {
        let dir = &self.settings.dir;
        tokio::fs::create_dir_all(dir).await?;

        let file_name = key.file_name(format);
        let path = dir.join(&file_name);
        let nonce = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_path = dir.join(format!(".{file_name}.tmp-{}-{nonce}", std::process::id()));

        if let Err(e) = tokio::fs::write(&temp_path, buffer).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }

        Ok(path)
    }

    /// Path a key's image occupies on disk.
    pub fn disk_path(&self, key: &CacheKey, format: ImageFormat) -> PathBuf {
        self.settings.dir.join(key.file_name(format))
    }

    /// Whether the memory tier currently holds a fresh entry for `key`.
    pub async fn in_memory(&self, key: &CacheKey) -> bool {
        let now = SystemTime::now();
        self.memory
            .read()
            .await
            .get(key.as_str())
            .is_some_and(|entry| entry.is_fresh(self.settings.memory_ttl, now))
    }

    /// Drop memory entries past their TTL. Returns the number removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = SystemTime::now();
        let ttl = self.settings.memory_ttl;
        let mut memory = self.memory.write().await;
        let before = memory.len();
        memory.retain(|_, entry| entry.is_fresh(ttl, now));
        before - memory.len()
    }

    pub async fn memory_len(&self) -> usize {
        self.memory.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    const EPSILON: Duration = Duration::from_millis(1);

    fn settings(dir: &Path) -> CacheSettings {
        CacheSettings {
            dir: dir.join("og-cache"),
            memory_ttl: Duration::from_secs(60),
            disk_ttl: Duration::from_secs(3600),
        }
    }

    fn key(path: &str) -> CacheKey {
        CacheKey::derive(path, "x.test", ImageFormat::Webp)
    }

    async fn written_at(cache: &TwoTierCache, key: &CacheKey) -> SystemTime {
        cache.memory.read().await.get(key.as_str()).unwrap().written_at
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let tmp = TempDir::new().unwrap();
        let cache = TwoTierCache::new(settings(tmp.path()));
        let key = key("/about");

        cache.put(&key, Bytes::from_static(b"webp-bytes"), ImageFormat::Webp).await;

        let hit = cache.lookup(&key).await.unwrap();
        assert_eq!(hit.buffer, Bytes::from_static(b"webp-bytes"));
        assert_eq!(hit.tier, Tier::Memory);
        assert_eq!(hit.format, ImageFormat::Webp);
        assert!(cache.disk_path(&key, ImageFormat::Webp).exists());
    }

    #[tokio::test]
    async fn test_disk_reads_only_the_keys_format() {
        let tmp = TempDir::new().unwrap();
        let cache = TwoTierCache::new(settings(tmp.path()));
        let key = key("/about");

        std::fs::create_dir_all(cache.settings().dir.clone()).unwrap();
        std::fs::write(cache.disk_path(&key, ImageFormat::Png), b"png-bytes").unwrap();
        assert!(cache.lookup(&key).await.is_none());

        std::fs::write(cache.disk_path(&key, ImageFormat::Webp), b"webp-bytes").unwrap();
        let hit = cache.lookup(&key).await.unwrap();
        assert_eq!(hit.tier, Tier::Disk);
        assert_eq!(hit.format, ImageFormat::Webp);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let tmp = TempDir::new().unwrap();
        let cache = TwoTierCache::new(settings(tmp.path()));
        assert!(cache.get(&key("/nothing")).await.is_none());
    }

    #[tokio::test]
    async fn test_memory_ttl_boundary() {
        let tmp = TempDir::new().unwrap();
        let cache = TwoTierCache::new(settings(tmp.path()));
        let key = key("/");
        cache.put(&key, Bytes::from_static(b"img"), ImageFormat::Webp).await;
        let t = written_at(&cache, &key).await;
        let ttl = cache.settings().memory_ttl;

        let hit = cache.lookup_at(&key, t + ttl - EPSILON).await.unwrap();
        assert_eq!(hit.tier, Tier::Memory);

        // Memory is stale; the longer-lived disk copy answers instead.
        let hit = cache.lookup_at(&key, t + ttl + EPSILON).await.unwrap();
        assert_eq!(hit.tier, Tier::Disk);
    }

    #[tokio::test]
    async fn test_disk_ttl_boundary() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(tmp.path());
        let key = key("/blog");
        TwoTierCache::new(settings.clone())
            .put(&key, Bytes::from_static(b"img"), ImageFormat::Webp)
            .await;

        let path = settings.dir.join(key.file_name(ImageFormat::Webp));
        let mtime = std::fs::metadata(&path).unwrap().modified().unwrap();

        let fresh = TwoTierCache::new(settings.clone());
        let hit = fresh.lookup_at(&key, mtime + settings.disk_ttl - EPSILON).await.unwrap();
        assert_eq!(hit.tier, Tier::Disk);

        let restarted = TwoTierCache::new(settings.clone());
        assert!(restarted.lookup_at(&key, mtime + settings.disk_ttl + EPSILON).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_hit_promotes_to_memory() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(tmp.path());
        let key = key("/promote");
        TwoTierCache::new(settings.clone())
            .put(&key, Bytes::from_static(b"img"), ImageFormat::Webp)
            .await;

        let restarted = TwoTierCache::new(settings);
        assert!(!restarted.in_memory(&key).await);

        let hit = restarted.lookup(&key).await.unwrap();
        assert_eq!(hit.tier, Tier::Disk);
        assert!(restarted.in_memory(&key).await);

        let hit = restarted.lookup(&key).await.unwrap();
        assert_eq!(hit.tier, Tier::Memory);
    }

    #[tokio::test]
    async fn test_empty_entries_are_misses() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(tmp.path());
        let cache = TwoTierCache::new(settings.clone());
        let key = key("/empty");

        cache.memory.write().await.insert(
            key.as_str().to_string(),
            CacheEntry { buffer: Bytes::new(), format: ImageFormat::Webp, written_at: SystemTime::now() },
        );
        std::fs::create_dir_all(&settings.dir).unwrap();
        std::fs::write(settings.dir.join(key.file_name(ImageFormat::Webp)), b"").unwrap();

        assert!(cache.get(&key).await.is_none());
        assert_eq!(cache.memory_len().await, 0);
    }

    #[tokio::test]
    async fn test_put_ignores_empty_buffer() {
        let tmp = TempDir::new().unwrap();
        let cache = TwoTierCache::new(settings(tmp.path()));
        let key = key("/empty-put");

        cache.put(&key, Bytes::new(), ImageFormat::Webp).await;

        assert_eq!(cache.memory_len().await, 0);
        assert!(!cache.disk_path(&key, ImageFormat::Webp).exists());
    }

    #[tokio::test]
    async fn test_disk_write_failure_still_populates_memory() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, b"file in the way").unwrap();
        let cache = TwoTierCache::new(CacheSettings {
            dir: blocker,
            memory_ttl: Duration::from_secs(60),
            disk_ttl: Duration::from_secs(3600),
        });
        let key = key("/unwritable");

        cache.put(&key, Bytes::from_static(b"img"), ImageFormat::Webp).await;

        assert_eq!(cache.get(&key).await, Some(Bytes::from_static(b"img")));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(tmp.path());
        let cache = TwoTierCache::new(settings.clone());
        let key = key("/race");

        cache.put(&key, Bytes::from_static(b"first"), ImageFormat::Webp).await;
        cache.put(&key, Bytes::from_static(b"second"), ImageFormat::Webp).await;

        assert_eq!(cache.get(&key).await, Some(Bytes::from_static(b"second")));
        let on_disk = std::fs::read(cache.disk_path(&key, ImageFormat::Webp)).unwrap();
        assert_eq!(on_disk, b"second");
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let tmp = TempDir::new().unwrap();
        let cache = TwoTierCache::new(settings(tmp.path()));
        let old = key("/old");
        let new = key("/new");

        cache.memory.write().await.insert(
            old.as_str().to_string(),
            CacheEntry {
                buffer: Bytes::from_static(b"old"),
                format: ImageFormat::Webp,
                written_at: SystemTime::now() - Duration::from_secs(120),
            },
        );
        cache.put(&new, Bytes::from_static(b"new"), ImageFormat::Webp).await;

        assert_eq!(cache.cleanup_expired().await, 1);
        assert_eq!(cache.memory_len().await, 1);
        assert!(cache.in_memory(&new).await);
    }

    #[test]
    fn test_settings_from_config() {
        let config = OgCacheConfig::default();
        let settings = CacheSettings::from_config(&config);
        assert_eq!(settings.dir, PathBuf::from(".seokit-og-cache"));
        assert_eq!(settings.memory_ttl, Duration::from_secs(3600));
        assert_eq!(settings.disk_ttl, Duration::from_secs(86_400));
    }
}
