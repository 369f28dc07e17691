//! Short-lived memoization of workbook downloads.
//!
//! Entries are keyed by (access token, file id), so a token rotation naturally misses. The cache
//! never outlives the process; its contract is purely "avoid a second download within one
//! session". Any write to a file must invalidate every entry for that file, whatever token it was
//! fetched under.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct CacheKey {
    access_token: String,
    file_id: String,
}

#[derive(Debug, Clone)]
struct Entry {
    bytes: Vec<u8>,
    fetched_at: Instant,
}

#[derive(Debug)]
pub(crate) struct WorkbookCache {
    ttl: Duration,
    entries: HashMap<CacheKey, Entry>,
}

impl WorkbookCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// A fresh copy of the bytes, or `None` on miss or expiry.
    pub(crate) fn get(&self, access_token: &str, file_id: &str) -> Option<Vec<u8>> {
        let key = CacheKey {
            access_token: access_token.to_string(),
            file_id: file_id.to_string(),
        };
        let entry = self.entries.get(&key)?;
        if entry.fetched_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.bytes.clone())
    }

    pub(crate) fn put(&mut self, access_token: &str, file_id: &str, bytes: Vec<u8>) {
        let key = CacheKey {
            access_token: access_token.to_string(),
            file_id: file_id.to_string(),
        };
        self.entries.insert(
            key,
            Entry {
                bytes,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drops every entry for `file_id`, across all tokens it was fetched under.
    pub(crate) fn invalidate_file(&mut self, file_id: &str) {
        self.entries.retain(|key, _| key.file_id != file_id);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let mut cache = WorkbookCache::new(Duration::from_secs(60));
        cache.put("tok", "file-1", vec![1, 2, 3]);
        assert_eq!(cache.get("tok", "file-1"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_miss_on_other_token_or_file() {
        let mut cache = WorkbookCache::new(Duration::from_secs(60));
        cache.put("tok", "file-1", vec![1]);
        assert_eq!(cache.get("other", "file-1"), None);
        assert_eq!(cache.get("tok", "file-2"), None);
    }

    #[test]
    fn test_expiry() {
        let mut cache = WorkbookCache::new(Duration::from_millis(0));
        cache.put("tok", "file-1", vec![1]);
        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(cache.get("tok", "file-1"), None);
    }

    #[test]
    fn test_invalidate_file_across_tokens() {
        let mut cache = WorkbookCache::new(Duration::from_secs(60));
        cache.put("tok-a", "file-1", vec![1]);
        cache.put("tok-b", "file-1", vec![2]);
        cache.put("tok-a", "file-2", vec![3]);

        cache.invalidate_file("file-1");
        assert_eq!(cache.get("tok-a", "file-1"), None);
        assert_eq!(cache.get("tok-b", "file-1"), None);
        assert_eq!(cache.get("tok-a", "file-2"), Some(vec![3]));
    }
}
