//! Key-value persistence for builder sessions and finalized portfolios.
//!
//! Redis when `REDIS_URL` is set, otherwise an in-process map.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("stored value under '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode value: {0}")]
    Encode(#[source] serde_json::Error),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value`, replacing any previous one. Expires after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError>;

    /// Stores `value` only when `key` is absent. Returns whether it was stored.
    async fn set_if_absent(&self, key: &str, value: String, ttl: Duration) -> Result<bool, StoreError>;

    /// Removes `key` if it still holds `value`.
    async fn remove_if_equal(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

const REMOVE_IF_EQUAL: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
end
return 0
"#;

pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds).await?;
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: String, ttl: Duration) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn remove_if_equal(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        redis::Script::new(REMOVE_IF_EQUAL)
            .key(key)
            .arg(value)
            .invoke_async::<_, i64>(&mut conn)
            .await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, expires)| *expires > Instant::now())
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, (_, expires)| *expires > now);
        entries.insert(key.to_string(), (value, now + ttl));
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: String, ttl: Duration) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        if entries.get(key).is_some_and(|(_, expires)| *expires > now) {
            return Ok(false);
        }
        entries.insert(key.to_string(), (value, now + ttl));
        Ok(true)
    }

    async fn remove_if_equal(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|(current, _)| current == value) {
            entries.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_memory_store_set_replaces_value() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").await.unwrap(), None);

        store.set("a", "1".to_string(), HOUR).await.unwrap();
        store.set("a", "2".to_string(), HOUR).await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_expires_entries() {
        let store = MemoryStore::new();
        store.set("a", "1".to_string(), Duration::ZERO).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_set_if_absent() {
        let store = MemoryStore::new();
        assert!(store.set_if_absent("lock", "t1".to_string(), HOUR).await.unwrap());
        assert!(!store.set_if_absent("lock", "t2".to_string(), HOUR).await.unwrap());
        assert_eq!(store.get("lock").await.unwrap().as_deref(), Some("t1"));

        store.set("stale", "t1".to_string(), Duration::ZERO).await.unwrap();
        assert!(store.set_if_absent("stale", "t2".to_string(), HOUR).await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_remove_if_equal_checks_value() {
        let store = MemoryStore::new();
        store.set("lock", "t1".to_string(), HOUR).await.unwrap();
        store.remove_if_equal("lock", "t2").await.unwrap();
        assert_eq!(store.get("lock").await.unwrap().as_deref(), Some("t1"));

        store.remove_if_equal("lock", "t1").await.unwrap();
        assert_eq!(store.get("lock").await.unwrap(), None);
    }
}
