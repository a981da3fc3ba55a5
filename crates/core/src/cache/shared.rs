//! Redis-backed shared store.
//!
//! This is the durable variant of the backing store: entries survive process
//! restarts and are visible to every worker pointed at the same server, which
//! is what makes cross-process request coalescing possible. Expiry rides on
//! Redis' native per-key TTL.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;

/// Handle to a Redis server, validated by a ping at connect time.
///
/// All methods return `redis::RedisResult`; the caller ([`super::store::CacheStore`])
/// is responsible for absorbing failures into miss/no-op semantics.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connect to `url` and verify the server answers a round-trip ping.
    pub async fn connect(url: &str) -> redis::RedisResult<Self> {
        let client = redis::Client::open(url)?;
        let mut conn = client.get_connection_manager().await?;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::debug!("redis ping answered: {pong}");

        Ok(Self { conn })
    }

    pub async fn read(&self, key: &str) -> redis::RedisResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key).await
    }

    pub async fn write(&self, key: &str, value: &str, ttl: Duration) -> redis::RedisResult<()> {
        let mut conn = self.conn.clone();
        conn.set_ex(key, value, ttl_secs(ttl)).await
    }

    pub async fn delete(&self, key: &str) -> redis::RedisResult<()> {
        let mut conn = self.conn.clone();
        conn.del(key).await
    }

    /// Atomic `SET key 1 NX EX ttl`. Returns true iff this call created the
    /// key, i.e. the caller won the race.
    pub async fn try_create(&self, key: &str, ttl: Duration) -> redis::RedisResult<bool> {
        let mut conn = self.conn.clone();
        let created: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await?;
        Ok(created.is_some())
    }

    /// List keys under `prefix`. Best-effort administrative primitive; key
    /// cardinality here is one per distinct query, so KEYS is acceptable.
    pub async fn keys_with_prefix(&self, prefix: &str) -> redis::RedisResult<Vec<String>> {
        let mut conn = self.conn.clone();
        conn.keys(format!("{prefix}*")).await
    }

    pub async fn delete_all(&self, keys: Vec<String>) -> redis::RedisResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        conn.del(keys).await
    }
}

/// Redis EX takes whole seconds; never pass 0, which would be rejected.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_secs_floor() {
        assert_eq!(ttl_secs(Duration::from_millis(200)), 1);
        assert_eq!(ttl_secs(Duration::from_secs(600)), 600);
    }
}
