//! Disk-backed HTTP response cache with time-based expiry.
//!
//! Each request key owns a directory (see [`key`]) holding entry files named
//! `<expiry-epoch-ms>.txt`. Freshness is decided only from the expiry encoded
//! in the file name, never from file metadata, so copied or restored cache
//! trees keep their expiry.
//!
//! Expired files are removed lazily by [`CacheStore::read`] and in bulk by
//! [`CacheStore::prune_expired`]. Neither is atomic: the store assumes a
//! single owning process and takes no locks.

pub mod clock;
pub mod key;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{cache_key_path, CacheKey};

use crate::config::Config;
use crate::error::{Result, TrackerError};
use crate::metrics::CacheMetrics;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::debug;

pub const ENTRY_EXTENSION: &str = "txt";

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>, default_ttl: Duration) -> Self {
        Self::with_clock(root, default_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(root: impl Into<PathBuf>, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            root: root.into(),
            default_ttl,
            clock,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_dir.clone(), config.cache_ttl())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn key_path(&self, url: &str, method: &str) -> Result<PathBuf> {
        cache_key_path(&self.root, url, method)
    }

    /// Returns the first fresh entry for the key, deleting expired ones it passes.
    ///
    /// Fails with [`TrackerError::CacheMiss`] when the key directory is absent
    /// or nothing fresh is left in it.
    pub async fn read(&self, url: &str, method: &str) -> Result<String> {
        let dir = self.key_path(url, method)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                CacheMetrics::record_miss();
                return Err(TrackerError::CacheMiss { path: dir });
            }
            Err(e) => return Err(e.into()),
        };

        let now = self.clock.now_millis();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(expiry) = entry.file_name().to_str().and_then(parse_expiry) else {
                continue;
            };
            let path = entry.path();

            if now < expiry {
                match fs::read_to_string(&path).await {
                    Ok(body) => {
                        debug!(path = %path.display(), "cache hit");
                        CacheMetrics::record_hit();
                        return Ok(body);
                    }
                    // removed between listing and reading
                    Err(e) if e.kind() == ErrorKind::NotFound => continue,
                    Err(e) => return Err(e.into()),
                }
            }

            if remove_entry(&path).await? {
                debug!(path = %path.display(), "pruned expired cache entry");
                CacheMetrics::record_pruned(1);
            }
        }

        CacheMetrics::record_miss();
        Err(TrackerError::CacheMiss { path: dir })
    }

    /// Stores `body` under a new entry expiring `ttl` (or the default TTL) from now.
    ///
    /// Older entries of the same key are left in place for `read` to prune.
    pub async fn write(&self, url: &str, method: &str, body: &str, ttl: Option<Duration>) -> Result<PathBuf> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expiry = self.clock.now_millis().saturating_add(ttl_ms);
        let dir = self.key_path(url, method)?;
        fs::create_dir_all(&dir).await?;

        let path = dir.join(entry_file_name(expiry));
        // the temporary name does not end in `.txt`, so readers never see a partial body
        let tmp = dir.join(temp_file_name(expiry));
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), ttl_ms, "cache write");
        CacheMetrics::record_write(body.len());
        Ok(path)
    }

    /// Walks the whole cache tree and deletes every expired entry file.
    pub async fn prune_expired(&self) -> Result<usize> {
        let now = self.clock.now_millis();
        let mut pending = vec![key::http_root(&self.root)];
        let mut removed = 0;

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                    continue;
                }
                let expired = entry
                    .file_name()
                    .to_str()
                    .and_then(parse_expiry)
                    .is_some_and(|expiry| now >= expiry);
                if file_type.is_file() && expired && remove_entry(&entry.path()).await? {
                    removed += 1;
                }
            }
        }

        CacheMetrics::record_pruned(removed);
        debug!(removed, root = %self.root.display(), "cache prune finished");
        Ok(removed)
    }
}

fn entry_file_name(expiry: i64) -> String {
    format!("{}.{}", expiry, ENTRY_EXTENSION)
}

// unique per write, so concurrent writers of one entry never share a temp file
fn temp_file_name(expiry: i64) -> String {
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}.{}.{}.tmp", entry_file_name(expiry), std::process::id(), seq)
}

/// Expiry instant encoded in an entry file name, if it follows the convention.
pub fn parse_expiry(file_name: &str) -> Option<i64> {
    let stem = file_name.strip_suffix(ENTRY_EXTENSION)?.strip_suffix('.')?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

// Ok(false) when someone else removed it first
async fn remove_entry(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
