use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::application::ports::session_store::SessionStore;

/// Sessions kept as Redis strings with a native expiry, shared by every
/// instance pointed at the same server.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisSessionStore {
    pub async fn connect(url: &str, prefix: impl Into<String>) -> anyhow::Result<Self> {
        let client = redis::Client::open(url).context("redis_client_open")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("redis_connection_manager")?;
        Ok(Self {
            conn,
            prefix: prefix.into(),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(self.key(key)).await.context("redis_get")?;
        Ok(payload)
    }

    async fn save(&self, key: &str, payload: &str, ttl: Duration) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let secs = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(self.key(key), payload, secs)
            .await
            .context("redis_set_ex")?;
        Ok(())
    }

    async fn destroy(&self, key: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.del(self.key(key)).await.context("redis_del")?;
        Ok(())
    }
}
