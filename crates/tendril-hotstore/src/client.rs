//! Hot-state client (§6.1 `HotStore`): thin wrapper over a multiplexed
//! `redis::aio::ConnectionManager`, mirroring the connect-then-wrap pattern
//! used elsewhere in the corpus for Redis-backed caches.

use crate::error::Result;
use crate::lock::{self, random_token};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Clone)]
pub struct HotStoreClient {
    manager: ConnectionManager,
}

impl HotStoreClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }

    fn conn(&self) -> ConnectionManager {
        self.manager.clone()
    }

    pub async fn set_json_ex<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let mut conn = self.conn();
        let _: () = conn.set_ex(key, json, ttl_secs).await?;
        Ok(())
    }

    pub async fn set_no_ttl<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let mut conn = self.conn();
        let _: () = conn.set(key, json).await?;
        Ok(())
    }

    /// Plain, non-JSON read (e.g. a lock's raw token/PID value).
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn();
        Ok(conn.get(key).await?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.conn();
        let raw: Option<String> = conn.get(key).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.conn();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    pub async fn sadd(&self, set_key: &str, member: &str) -> Result<()> {
        let mut conn = self.conn();
        let _: () = conn.sadd(set_key, member).await?;
        Ok(())
    }

    pub async fn srem(&self, set_key: &str, member: &str) -> Result<()> {
        let mut conn = self.conn();
        let _: () = conn.srem(set_key, member).await?;
        Ok(())
    }

    pub async fn smembers(&self, set_key: &str) -> Result<Vec<String>> {
        let mut conn = self.conn();
        Ok(conn.smembers(set_key).await?)
    }

    pub async fn hset_json<T: Serialize>(&self, hash_key: &str, field: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let mut conn = self.conn();
        let _: () = conn.hset(hash_key, field, json).await?;
        Ok(())
    }

    pub async fn hget_json<T: DeserializeOwned>(&self, hash_key: &str, field: &str) -> Result<Option<T>> {
        let mut conn = self.conn();
        let raw: Option<String> = conn.hget(hash_key, field).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn hdel(&self, hash_key: &str, field: &str) -> Result<()> {
        let mut conn = self.conn();
        let _: () = conn.hdel(hash_key, field).await?;
        Ok(())
    }

    pub async fn hgetall_json<T: DeserializeOwned>(&self, hash_key: &str) -> Result<Vec<(String, T)>> {
        let mut conn = self.conn();
        let raw: Vec<(String, String)> = conn.hgetall(hash_key).await?;
        raw.into_iter()
            .map(|(field, json)| Ok((field, serde_json::from_str(&json)?)))
            .collect()
    }

    pub async fn publish_json<T: Serialize>(&self, channel: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let mut conn = self.conn();
        let _: () = conn.publish(channel, json).await?;
        Ok(())
    }

    /// A dedicated connection usable for `SUBSCRIBE`; pub/sub holds a
    /// connection open for the life of the subscription, so it must not
    /// share the pooled `ConnectionManager`.
    pub async fn subscriber_connection(&self, url: &str) -> Result<redis::aio::PubSub> {
        let client = Client::open(url)?;
        Ok(client.get_async_pubsub().await?)
    }

    pub async fn try_acquire_lock(&self, key: &str, value: &str, ttl_ms: usize) -> Result<bool> {
        let mut conn = self.conn();
        lock::try_acquire(&mut conn, key, value, ttl_ms).await
    }

    pub async fn refresh_lock(&self, key: &str, value: &str, ttl_ms: usize) -> Result<bool> {
        let mut conn = self.conn();
        lock::refresh(&mut conn, key, value, ttl_ms).await
    }

    pub async fn release_lock(&self, key: &str, value: &str) -> Result<bool> {
        let mut conn = self.conn();
        lock::release(&mut conn, key, value).await
    }

    pub fn new_lock_token(&self) -> String {
        random_token()
    }
}
