//! In-process fallback store.
//!
//! Used when no Redis URL is configured or the configured server does not
//! answer the startup ping. Entries carry their own deadline and are purged
//! lazily on access; there is no background sweep.
//!
//! Atomicity of `try_create` holds only within this process. Coalescing
//! across multiple processes requires the shared store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Process-local key/value store with per-entry TTL.
///
/// A single mutex serializes every read-check-expire-delete and write
/// sequence, which is what makes `try_create` a usable lock primitive
/// for tasks within one process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn read(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if entry.expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    pub fn write(&self, key: &str, value: &str, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), Entry { value: value.to_string(), expires_at: Instant::now() + ttl });
    }

    pub fn delete(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }

    /// Insert `key` only if it is absent or expired. Returns true iff the
    /// caller created the entry.
    pub fn try_create(&self, key: &str, ttl: Duration) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = entries.get(key)
            && !existing.expired()
        {
            return false;
        }
        entries.insert(key.to_string(), Entry { value: "1".to_string(), expires_at: Instant::now() + ttl });
        true
    }

    /// Count live entries whose key starts with `prefix`.
    pub fn count_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| !entry.expired());
        entries.keys().filter(|k| k.starts_with(prefix)).count()
    }

    /// Count live entries under `prefix` whose key does not end in `suffix`.
    pub fn count_prefix_excluding(&self, prefix: &str, suffix: &str) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| !entry.expired());
        entries
            .keys()
            .filter(|k| k.starts_with(prefix) && !k.ends_with(suffix))
            .count()
    }

    /// Drop every entry whose key starts with `prefix`.
    pub fn clear_prefix(&self, prefix: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|k, _| !k.starts_with(prefix));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(600);

    #[tokio::test]
    async fn test_write_and_read() {
        let store = MemoryStore::default();
        store.write("k", "v", TTL);
        assert_eq!(store.read("k").as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_read_missing() {
        let store = MemoryStore::default();
        assert!(store.read("absent").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lazy_expiry_on_read() {
        let store = MemoryStore::default();
        store.write("k", "v", TTL);

        tokio::time::advance(Duration::from_secs(601)).await;

        assert!(store.read("k").is_none());
        // entry was deleted on access, not just hidden
        assert_eq!(store.count_prefix(""), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::default();
        store.write("k", "v", TTL);
        store.delete("k");
        assert!(store.read("k").is_none());
    }

    #[tokio::test]
    async fn test_try_create_is_exclusive() {
        let store = MemoryStore::default();
        assert!(store.try_create("lock", TTL));
        assert!(!store.try_create("lock", TTL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_try_create_succeeds_after_expiry() {
        let store = MemoryStore::default();
        assert!(store.try_create("lock", Duration::from_secs(30)));

        tokio::time::advance(Duration::from_secs(31)).await;

        assert!(store.try_create("lock", Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_prefix_operations() {
        let store = MemoryStore::default();
        store.write("ns:a", "1", TTL);
        store.write("ns:b", "2", TTL);
        store.write("other:c", "3", TTL);

        assert_eq!(store.count_prefix("ns:"), 2);

        store.clear_prefix("ns:");
        assert_eq!(store.count_prefix("ns:"), 0);
        assert_eq!(store.read("other:c").as_deref(), Some("3"));
    }
}
