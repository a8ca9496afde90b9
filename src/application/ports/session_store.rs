use async_trait::async_trait;
use std::time::Duration;

/// Opaque session payload storage. Keys are digests of the cookie value and
/// payloads are already sealed by the caller.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn save(&self, key: &str, payload: &str, ttl: Duration) -> anyhow::Result<()>;
    async fn destroy(&self, key: &str) -> anyhow::Result<()>;

    /// Drops expired entries; returns how many were removed. Stores with
    /// native expiry keep the default.
    async fn purge_expired(&self) -> anyhow::Result<u64> {
        Ok(0)
    }
}
