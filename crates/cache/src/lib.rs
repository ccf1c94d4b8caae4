//! Response Cache (C6, §4.6): a TTL-bounded, size-ceilinged, file-backed
//! store of previously generated answers, keyed by the normalized question
//! and response format.
//!
//! Each entry is one JSON file named by its fingerprint. Writes go to a
//! temporary file in the same directory and are renamed into place, so a
//! reader never observes a partially written entry. Maintenance (expired-entry
//! removal and size-ceiling eviction) is gated to run at most once per
//! `cleanup_interval_hours`, tracked by a mutex-guarded timestamp rather than
//! a background task, since writes already happen on the request path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use parking_lot::Mutex;
use query_engine_core::{CachedResponse, Query, ResponseFormat};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache directory error: {0}")]
    Directory(#[source] io::Error),

    #[error("cache io error: {0}")]
    Io(#[source] io::Error),

    #[error("cache entry is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
}

impl From<CacheError> for query_engine_core::Error {
    fn from(err: CacheError) -> Self {
        query_engine_core::Error::Cache(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Snapshot of cache occupancy for `GET /cache/stats` (§6.1).
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub entry_count: usize,
    pub total_bytes: u64,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

pub struct ResponseCache {
    directory: PathBuf,
    ttl: chrono::Duration,
    cleanup_interval: chrono::Duration,
    size_ceiling_bytes: u64,
    last_cleanup: Mutex<Option<DateTime<Utc>>>,
}

impl ResponseCache {
    pub fn new(directory: impl Into<PathBuf>, ttl_days: u32, cleanup_interval_hours: u32, size_ceiling_bytes: u64) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(CacheError::Directory)?;

        Ok(Self {
            directory,
            ttl: chrono::Duration::days(ttl_days as i64),
            cleanup_interval: chrono::Duration::hours(cleanup_interval_hours as i64),
            size_ceiling_bytes,
            last_cleanup: Mutex::new(None),
        })
    }

    /// The cache key for a query: `md5(question_normalized + "_" + format)`
    /// (§4.6), matching the original's exact key derivation.
    pub fn fingerprint(question_normalized: &str, format: ResponseFormat) -> String {
        let mut hasher = Md5::new();
        hasher.update(question_normalized.as_bytes());
        hasher.update(b"_");
        hasher.update(format.as_str().as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn fingerprint_for(query: &Query, question_normalized: &str) -> String {
        Self::fingerprint(question_normalized, query.format)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }

    /// Reads the entry for `key`, returning `None` if absent, unparsable, or
    /// past its TTL. An expired-but-still-present file is left for the next
    /// maintenance pass to remove, not deleted eagerly on read.
    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        let path = self.path_for(key);
        let raw = fs::read_to_string(&path).ok()?;
        let entry: CachedResponse = serde_json::from_str(&raw).ok()?;

        if entry.age() > self.ttl {
            return None;
        }

        Some(entry)
    }

    /// Writes `response` under `key`, then runs maintenance if the cleanup
    /// interval has elapsed.
    pub fn put(&self, key: &str, response: &CachedResponse) -> Result<()> {
        let path = self.path_for(key);
        let tmp_path = self.directory.join(format!("{key}.json.tmp"));

        let serialized = serde_json::to_string_pretty(response).map_err(CacheError::Corrupt)?;
        fs::write(&tmp_path, serialized).map_err(CacheError::Io)?;
        fs::rename(&tmp_path, &path).map_err(CacheError::Io)?;

        self.maintain_if_due();
        Ok(())
    }

    /// Removes every entry immediately, for `POST /cache/clear` (§6.1).
    /// Returns the number of entries removed.
    pub fn clear_all(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in self.entries()? {
            fs::remove_file(&entry).map_err(CacheError::Io)?;
            removed += 1;
        }
        Ok(removed)
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let mut total_bytes = 0u64;
        let mut oldest: Option<DateTime<Utc>> = None;
        let mut newest: Option<DateTime<Utc>> = None;
        let mut entry_count = 0usize;

        for path in self.entries()? {
            let Ok(meta) = fs::metadata(&path) else { continue };
            total_bytes += meta.len();
            entry_count += 1;

            if let Ok(raw) = fs::read_to_string(&path) {
                if let Ok(entry) = serde_json::from_str::<CachedResponse>(&raw) {
                    oldest = Some(oldest.map_or(entry.timestamp, |o| o.min(entry.timestamp)));
                    newest = Some(newest.map_or(entry.timestamp, |n| n.max(entry.timestamp)));
                }
            }
        }

        Ok(CacheStats {
            entry_count,
            total_bytes,
            oldest,
            newest,
        })
    }

    fn entries(&self) -> Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.directory).map_err(CacheError::Directory)? {
            let entry = entry.map_err(CacheError::Io)?;
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                out.push(path);
            }
        }
        Ok(out)
    }

    fn maintain_if_due(&self) {
        let mut last_cleanup = self.last_cleanup.lock();
        let now = Utc::now();
        if let Some(last) = *last_cleanup {
            if now.signed_duration_since(last) < self.cleanup_interval {
                return;
            }
        }

        if let Err(e) = self.remove_expired() {
            tracing::warn!(error = %e, "cache expired-entry cleanup failed");
        }
        if let Err(e) = self.enforce_size_ceiling() {
            tracing::warn!(error = %e, "cache size-ceiling cleanup failed");
        }

        *last_cleanup = Some(now);
    }

    fn remove_expired(&self) -> Result<()> {
        for path in self.entries()? {
            let Ok(raw) = fs::read_to_string(&path) else {
                continue;
            };
            let Ok(entry) = serde_json::from_str::<CachedResponse>(&raw) else {
                // Unparsable entries are treated as corrupt and removed.
                let _ = fs::remove_file(&path);
                continue;
            };
            if entry.age() > self.ttl {
                fs::remove_file(&path).map_err(CacheError::Io)?;
            }
        }
        Ok(())
    }

    fn enforce_size_ceiling(&self) -> Result<()> {
        let mut sized: Vec<(PathBuf, u64, SystemTime)> = Vec::new();
        let mut total: u64 = 0;

        for path in self.entries()? {
            let meta = fs::metadata(&path).map_err(CacheError::Io)?;
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            total += meta.len();
            sized.push((path, meta.len(), modified));
        }

        if total <= self.size_ceiling_bytes {
            return Ok(());
        }

        sized.sort_by_key(|(_, _, modified)| *modified);

        for (path, len, _) in sized {
            if total <= self.size_ceiling_bytes {
                break;
            }
            fs::remove_file(&path).map_err(CacheError::Io)?;
            total = total.saturating_sub(len);
        }

        Ok(())
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.path_for(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_core::Emotion;
    use tempfile::tempdir;

    fn cache(ttl_days: u32, size_ceiling_bytes: u64) -> (ResponseCache, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), ttl_days, 24, size_ceiling_bytes).unwrap();
        (cache, dir)
    }

    fn sample(question: &str) -> CachedResponse {
        CachedResponse::new(question, ResponseFormat::Web, "an answer", Emotion::Neutral)
    }

    #[test]
    fn fingerprint_is_deterministic_and_format_sensitive() {
        let a = ResponseCache::fingerprint("who is the director", ResponseFormat::Web);
        let b = ResponseCache::fingerprint("who is the director", ResponseFormat::Web);
        let c = ResponseCache::fingerprint("who is the director", ResponseFormat::Voice);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn put_then_get_round_trips() {
        let (cache, _dir) = cache(7, u64::MAX);
        let key = ResponseCache::fingerprint("who is the director", ResponseFormat::Web);
        cache.put(&key, &sample("who is the director")).unwrap();

        let fetched = cache.get(&key).expect("entry should be present");
        assert_eq!(fetched.llm_response, "an answer");
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let (cache, _dir) = cache(7, u64::MAX);
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn get_returns_none_for_expired_entry() {
        let (cache, _dir) = cache(7, u64::MAX);
        let key = "expired";
        let mut entry = sample("old question");
        entry.timestamp = Utc::now() - chrono::Duration::days(30);
        let serialized = serde_json::to_string(&entry).unwrap();
        fs::write(cache.path(key), serialized).unwrap();

        assert!(cache.get(key).is_none());
    }

    #[test]
    fn clear_all_removes_every_entry() {
        let (cache, _dir) = cache(7, u64::MAX);
        cache.put("a", &sample("question a")).unwrap();
        cache.put("b", &sample("question b")).unwrap();

        let removed = cache.clear_all().unwrap();
        assert_eq!(removed, 2);
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn stats_reports_entry_count_and_bytes() {
        let (cache, _dir) = cache(7, u64::MAX);
        cache.put("a", &sample("question a")).unwrap();
        cache.put("b", &sample("question b")).unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.entry_count, 2);
        assert!(stats.total_bytes > 0);
        assert!(stats.oldest.is_some());
    }

    #[test]
    fn size_ceiling_evicts_oldest_entries_first() {
        let (cache, _dir) = cache(7, 1);
        cache.put("a", &sample("question a with a longer body to take up space")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        cache.put("b", &sample("question b with a longer body to take up space")).unwrap();

        // Force maintenance synchronously rather than waiting on the
        // interval gate.
        cache.enforce_size_ceiling().unwrap();

        let stats = cache.stats().unwrap();
        assert!(stats.total_bytes as u64 <= 1 || stats.entry_count <= 1);
    }
}
