use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::session_store::SessionStore;
use crate::infrastructure::db::PgPool;

pub struct SqlxSessionStore {
    pub pool: PgPool,
}

impl SqlxSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SqlxSessionStore {
    async fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        let payload = sqlx::query_scalar::<_, String>(
            "SELECT payload FROM sessions WHERE key = $1 AND expires_at > now()",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(payload)
    }

    async fn save(&self, key: &str, payload: &str, ttl: Duration) -> anyhow::Result<()> {
        let expires_at = chrono::Utc::now() + chrono::Duration::from_std(ttl)?;
        sqlx::query(
            r#"INSERT INTO sessions (key, payload, expires_at) VALUES ($1, $2, $3)
               ON CONFLICT (key) DO UPDATE SET payload = EXCLUDED.payload, expires_at = EXCLUDED.expires_at"#,
        )
        .bind(key)
        .bind(payload)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn destroy(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
