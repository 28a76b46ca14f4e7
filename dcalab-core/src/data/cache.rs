//! File-backed TTL cache for provider responses.
//!
//! Layout: `{cache_dir}/{blake3(key)}.json`, one entry per file, each wrapped
//! in an envelope carrying the original key and the write timestamp.
//!
//! Features:
//! - Atomic writes (write to .tmp, rename into place)
//! - Time-to-live expiry checked on read
//! - Capacity-based eviction: past the cap, the oldest fraction of entries
//!   is dropped in one sweep
//! - Corrupt entries are removed on read, never returned
//!
//! The cache sits strictly above the provider traits: a `CachedHistoryProvider`
//! wraps any `PriceHistoryProvider`, and the simulator never sees either.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::provider::{DataError, PriceHistoryProvider};
use crate::domain::PricePoint;

/// Envelope written around every cached payload.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    key: String,
    cached_at_secs: u64,
    payload: T,
}

/// Capacity and eviction tuning.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// Maximum number of entries before an eviction sweep runs.
    pub capacity: usize,
    /// Fraction of entries (oldest first) removed per sweep.
    pub evict_fraction: f64,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            capacity: 200,
            evict_fraction: 0.3,
        }
    }
}

/// The file-backed TTL cache.
pub struct TtlCache {
    cache_dir: PathBuf,
    ttl: Duration,
    policy: CachePolicy,
}

impl TtlCache {
    /// 24-hour TTL with the default eviction policy.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self::with_ttl(cache_dir, Duration::from_secs(24 * 60 * 60))
    }

    pub fn with_ttl(cache_dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ttl,
            policy: CachePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Root directory of the cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let hash = blake3::hash(key.as_bytes()).to_hex();
        self.cache_dir.join(format!("{hash}.json"))
    }

    /// Store a payload under a key. Runs an eviction sweep afterwards if the
    /// entry count exceeds the capacity.
    pub fn put<T: Serialize>(&self, key: &str, payload: &T) -> Result<(), DataError> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let envelope = Envelope {
            key: key.to_string(),
            cached_at_secs: unix_now_secs(),
            payload,
        };
        let json = serde_json::to_vec(&envelope)
            .map_err(|e| DataError::CacheError(format!("entry serialization: {e}")))?;

        let path = self.entry_path(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &json)
            .map_err(|e| DataError::CacheError(format!("entry write: {e}")))?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::CacheError(format!("atomic rename failed: {e}"))
        })?;

        self.evict_if_over_capacity()?;
        Ok(())
    }

    /// Fetch a payload by key. Returns `None` on miss, expiry, or a corrupt
    /// entry (which is removed).
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.entry_path(key);
        let content = fs::read(&path).ok()?;

        let envelope: Envelope<T> = match serde_json::from_slice(&content) {
            Ok(env) => env,
            Err(e) => {
                eprintln!("WARNING: removing corrupt cache entry {}: {e}", path.display());
                let _ = fs::remove_file(&path);
                return None;
            }
        };

        let age = unix_now_secs().saturating_sub(envelope.cached_at_secs);
        if Duration::from_secs(age) >= self.ttl {
            let _ = fs::remove_file(&path);
            return None;
        }

        Some(envelope.payload)
    }

    /// Remove every entry. The directory itself is kept.
    pub fn clear(&self) -> Result<usize, DataError> {
        let mut removed = 0;
        for path in self.entry_paths()? {
            fs::remove_file(&path)
                .map_err(|e| DataError::CacheError(format!("remove entry: {e}")))?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Entry count and total size on disk.
    pub fn status(&self) -> Result<CacheStatus, DataError> {
        let mut entries = 0;
        let mut total_bytes = 0;
        for path in self.entry_paths()? {
            entries += 1;
            if let Ok(meta) = fs::metadata(&path) {
                total_bytes += meta.len();
            }
        }
        Ok(CacheStatus {
            entries,
            total_bytes,
        })
    }

    fn entry_paths(&self) -> Result<Vec<PathBuf>, DataError> {
        if !self.cache_dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.cache_dir)
            .map_err(|e| DataError::CacheError(format!("read dir: {e}")))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DataError::CacheError(format!("dir entry: {e}")))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Drop the oldest `evict_fraction` of entries once the count passes
    /// `capacity`. Age is taken from file mtime so the sweep never parses
    /// entries.
    fn evict_if_over_capacity(&self) -> Result<(), DataError> {
        let paths = self.entry_paths()?;
        if paths.len() <= self.policy.capacity {
            return Ok(());
        }

        let mut by_mtime: Vec<(SystemTime, PathBuf)> = paths
            .into_iter()
            .map(|p| {
                let mtime = fs::metadata(&p)
                    .and_then(|m| m.modified())
                    .unwrap_or(UNIX_EPOCH);
                (mtime, p)
            })
            .collect();
        by_mtime.sort_by_key(|(mtime, _)| *mtime);

        let evict_count =
            ((by_mtime.len() as f64) * self.policy.evict_fraction).ceil() as usize;
        for (_, path) in by_mtime.into_iter().take(evict_count.max(1)) {
            let _ = fs::remove_file(&path);
        }
        Ok(())
    }
}

/// Entry count and disk footprint of the cache.
#[derive(Debug, Clone)]
pub struct CacheStatus {
    pub entries: usize,
    pub total_bytes: u64,
}

fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// A `PriceHistoryProvider` that consults the cache before its inner provider.
///
/// Cache failures degrade to fetching: a broken cache never blocks data
/// access, it only costs the round trip.
pub struct CachedHistoryProvider<P> {
    inner: P,
    cache: TtlCache,
}

impl<P: PriceHistoryProvider> CachedHistoryProvider<P> {
    pub fn new(inner: P, cache: TtlCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    fn cache_key(&self, symbol: &str) -> String {
        format!("history/{}/{symbol}", self.inner.name())
    }
}

impl<P: PriceHistoryProvider> PriceHistoryProvider for CachedHistoryProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn monthly_history(&self, symbol: &str) -> Result<Vec<PricePoint>, DataError> {
        let key = self.cache_key(symbol);
        if let Some(points) = self.cache.get::<Vec<PricePoint>>(&key) {
            return Ok(points);
        }

        let points = self.inner.monthly_history(symbol)?;
        if let Err(e) = self.cache.put(&key, &points) {
            eprintln!("WARNING: failed to cache history for {symbol}: {e}");
        }
        Ok(points)
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}
