//! Short-lived in-memory state with a fixed time-to-live.
//!
//! Entries expire a fixed time after they were inserted. Expired entries are
//! invisible to readers immediately and are dropped either on access or by
//! [`ExpiringMap::purge_expired`], which the background sweeper calls.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

#[derive(Debug)]
pub struct ExpiringMap<V> {
    entries: DashMap<String, Entry<V>>,
    ttl: Duration,
}

impl<V: Clone> ExpiringMap<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&self, key: String, value: V) {
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !self.is_expired(&entry, now) {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, e| self.is_expired(e, now));
        None
    }

    /// Apply `f` to a live entry in place and return its result.
    pub fn modify<R>(&self, key: &str, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        let now = Instant::now();
        {
            let mut entry = self.entries.get_mut(key)?;
            if !self.is_expired(&entry, now) {
                return Some(f(&mut entry.value));
            }
        }
        self.entries.remove_if(key, |_, e| self.is_expired(e, now));
        None
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|(_, entry)| entry.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .get(key)
            .is_some_and(|entry| !self.is_expired(&entry, now))
    }

    /// Drop every expired entry and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !self.is_expired(entry, now));
        before.saturating_sub(self.entries.len())
    }

    fn is_expired(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.duration_since(entry.inserted_at) >= self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let map = ExpiringMap::new(Duration::from_secs(60));
        map.insert("a".into(), 1);

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(map.get("a"), Some(1));
        assert_eq!(map.modify("a", |v| { *v += 1; *v }), Some(2));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(map.get("a"), None);
        assert!(map.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_modify_does_not_extend_lifetime() {
        let map = ExpiringMap::new(Duration::from_secs(10));
        map.insert("a".into(), 0);

        tokio::time::advance(Duration::from_secs(9)).await;
        map.modify("a", |v| *v = 5);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(map.modify("a", |v| *v), None);
        assert!(!map.contains_key("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_removes_only_expired() {
        let map = ExpiringMap::new(Duration::from_secs(30));
        map.insert("old".into(), "x");
        tokio::time::advance(Duration::from_secs(20)).await;
        map.insert("new".into(), "y");
        tokio::time::advance(Duration::from_secs(10)).await;

        assert_eq!(map.purge_expired(), 1);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("new"), Some("y"));
    }
}
