use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::ports::session_store::SessionStore;

/// Process-local sessions. Lost on restart; single instance only.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(key)
            .filter(|(_, expires)| *expires > Instant::now())
            .map(|(payload, _)| payload.clone()))
    }

    async fn save(&self, key: &str, payload: &str, ttl: Duration) -> anyhow::Result<()> {
        let expires = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| anyhow::anyhow!("session ttl out of range: {ttl:?}"))?;
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (payload.to_string(), expires));
        Ok(())
    }

    async fn destroy(&self, key: &str) -> anyhow::Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn purge_expired(&self) -> anyhow::Result<u64> {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, (_, expires)| *expires > now);
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let store = MemorySessionStore::new();
        store.save("a", "payload", Duration::from_secs(60)).await.unwrap();
        store.save("b", "gone", Duration::ZERO).await.unwrap();
        assert_eq!(store.load("a").await.unwrap().as_deref(), Some("payload"));
        assert!(store.load("b").await.unwrap().is_none());
        assert_eq!(store.purge_expired().await.unwrap(), 1);
        store.destroy("a").await.unwrap();
        assert!(store.load("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unrepresentable_ttl_is_an_error() {
        let store = MemorySessionStore::new();
        assert!(store.save("a", "payload", Duration::MAX).await.is_err());
        assert!(store.load("a").await.unwrap().is_none());
    }
}
