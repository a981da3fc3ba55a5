//! Deterministic cache key derivation.

use sha2::{Digest, Sha256};

/// Namespace prefix for every key this cache writes to the backing store.
///
/// Administrative operations (count, clear) match on this prefix, so the
/// cache can share a Redis database with other applications.
pub const KEY_PREFIX: &str = "somo:cache:";

/// Suffix appended to a cache key to form its coalescing lock key.
pub const LOCK_SUFFIX: &str = ":lock";

/// Compute the namespaced cache key for an `(operation, query)` pair.
///
/// The two parts are joined with `|` and digested with SHA-256, so identical
/// pairs always map to the same key and distinct pairs collide only with
/// negligible probability. The digest also keeps arbitrary user questions
/// out of the key space of the backing store.
pub fn cache_key(op: &str, query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(op.as_bytes());
    hasher.update(b"|");
    hasher.update(query.as_bytes());
    format!("{KEY_PREFIX}{}", hex::encode(hasher.finalize()))
}

/// Derive the lock key guarding a cache key's computation.
pub fn lock_key(cache_key: &str) -> String {
    format!("{cache_key}{LOCK_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_stability() {
        let a = cache_key("summarize", "1");
        let b = cache_key("summarize", "1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_differs_by_operation() {
        assert_ne!(cache_key("summarize", "1"), cache_key("revision", "1"));
    }

    #[test]
    fn test_key_differs_by_query() {
        assert_ne!(cache_key("ask", "what is osmosis?"), cache_key("ask", "what is diffusion?"));
    }

    #[test]
    fn test_delimiter_prevents_concatenation_aliasing() {
        assert_ne!(cache_key("ab", "c"), cache_key("a", "bc"));
    }

    #[test]
    fn test_key_format() {
        let key = cache_key("summarize", "3.2");
        assert!(key.starts_with(KEY_PREFIX));
        let digest = &key[KEY_PREFIX.len()..];
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_no_collisions_across_corpus() {
        let ops = ["summarize", "revision", "ask", "translate"];
        let mut seen = HashSet::new();
        for i in 0..10_000 {
            let op = ops[i % ops.len()];
            let key = cache_key(op, &format!("chapter {i} question {}", i * 7));
            assert!(seen.insert(key), "collision at tuple {i}");
        }
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn test_lock_key_suffix() {
        let key = cache_key("ask", "q");
        let lock = lock_key(&key);
        assert_eq!(lock, format!("{key}:lock"));
    }
}
