//! Response cache
//!
//! Bounded LRU map from normalized username to shaped profile. Entries
//! expire a fixed time after insertion whether or not they are read.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::models::{normalize_username, ProfileSummary};

struct CachedProfile {
    profile: ProfileSummary,
    inserted_at: Instant,
}

pub struct ProfileCache {
    entries: Mutex<LruCache<String, CachedProfile>>,
    ttl: Duration,
}

impl ProfileCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached profile for `username`, if present and not expired
    pub async fn get(&self, username: &str) -> Option<ProfileSummary> {
        let key = normalize_username(username);
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(&key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.profile.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(&key);
        }
        None
    }

    /// Store a profile, evicting the least recently used entry when full
    pub async fn insert(&self, username: &str, profile: ProfileSummary) {
        let key = normalize_username(username);
        let entry = CachedProfile {
            profile,
            inserted_at: Instant::now(),
        };
        self.entries.lock().await.put(key, entry);
    }

    /// Number of stored entries, expired ones included until touched
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> ProfileSummary {
        ProfileSummary {
            full_name: name.to_string(),
            bio: String::new(),
            profile_pic_url: format!("https://cdn.example/{name}.jpg"),
            followers: 1,
            following: 1,
            posts_count: 1,
        }
    }

    #[tokio::test]
    async fn test_keys_are_case_and_space_insensitive() {
        let cache = ProfileCache::new(10, Duration::from_secs(600));
        cache.insert("  NatGeo ", profile("natgeo")).await;

        assert_eq!(cache.get("natgeo").await, Some(profile("natgeo")));
        assert_eq!(cache.get("NATGEO").await, Some(profile("natgeo")));
        assert_eq!(cache.get("\tnatgeo\n").await, Some(profile("natgeo")));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = ProfileCache::new(10, Duration::from_secs(600));
        cache.insert("someone", profile("someone")).await;

        tokio::time::advance(Duration::from_secs(599)).await;
        assert!(cache.get("someone").await.is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("someone").await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_do_not_extend_lifetime() {
        let cache = ProfileCache::new(10, Duration::from_secs(60));
        cache.insert("someone", profile("someone")).await;

        for _ in 0..5 {
            tokio::time::advance(Duration::from_secs(11)).await;
            assert!(cache.get("someone").await.is_some());
        }
        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(cache.get("someone").await.is_none());
    }

    #[tokio::test]
    async fn test_least_recently_used_is_evicted() {
        let cache = ProfileCache::new(2, Duration::from_secs(600));
        cache.insert("a", profile("a")).await;
        cache.insert("b", profile("b")).await;

        // Touch "a" so "b" becomes the eviction candidate
        assert!(cache.get("a").await.is_some());
        cache.insert("c", profile("c")).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("a").await.is_some());
        assert!(cache.get("b").await.is_none());
        assert!(cache.get("c").await.is_some());
    }

    #[tokio::test]
    async fn test_zero_capacity_still_holds_one() {
        let cache = ProfileCache::new(0, Duration::from_secs(600));
        cache.insert("a", profile("a")).await;
        assert_eq!(cache.len().await, 1);
    }
}
