use std::sync::Arc;

use crate::application::ports::geocoder::Geocoder;
use crate::application::ports::image_store::ImageStore;
use crate::application::ports::session_store::SessionStore;
use crate::bootstrap::app_context::AppServices;
use crate::bootstrap::config::{Config, DataBackend, SessionBackend, StorageBackend};
use crate::infrastructure::db::{self, PgPool};
use crate::infrastructure::db::repositories::{
    listing_repository_sqlx::SqlxListingRepository, review_repository_sqlx::SqlxReviewRepository,
    session_store_sqlx::SqlxSessionStore, user_repository_sqlx::SqlxUserRepository,
};
use crate::infrastructure::geocoding::UnconfiguredGeocoder;
use crate::infrastructure::geocoding::mapbox::MapboxGeocoder;
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::sessions::memory_store::MemorySessionStore;
use crate::infrastructure::sessions::redis_store::RedisSessionStore;
use crate::infrastructure::storage::fs_image_store::FsImageStore;
use crate::infrastructure::storage::s3_image_store::S3ImageStore;

pub const UPLOADS_ROUTE: &str = "/uploads";

/// Connects every adapter the configuration asks for.
pub async fn build_services(cfg: &Config) -> anyhow::Result<AppServices> {
    let pool: Option<PgPool> = match cfg.data_backend {
        DataBackend::Postgres => {
            let pool = db::connect_pool(&cfg.database_url, cfg.database_max_connections).await?;
            db::migrate(&pool).await?;
            Some(pool)
        }
        DataBackend::Memory => {
            tracing::warn!("data_backend_memory: records are lost on restart");
            None
        }
    };

    let session_store: Arc<dyn SessionStore> = match (cfg.session_backend, &pool) {
        (SessionBackend::Postgres, Some(pool)) => {
            Arc::new(SqlxSessionStore::new(pool.clone()))
        }
        (SessionBackend::Postgres, None) => {
            anyhow::bail!("postgres session store requires the postgres data backend")
        }
        (SessionBackend::Redis, _) => {
            let url = cfg
                .redis_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("REDIS_URL is required for redis sessions"))?;
            Arc::new(RedisSessionStore::connect(url, "wanderlust:sess").await?)
        }
        (SessionBackend::Memory, _) => Arc::new(MemorySessionStore::new()),
    };

    let geocoder: Arc<dyn Geocoder> = match &cfg.map_token {
        Some(token) => Arc::new(MapboxGeocoder::new(cfg.geocoding_base_url.clone(), token.clone())),
        None => {
            tracing::warn!("MAP_TOKEN unset: listing creation will fail until it is configured");
            Arc::new(UnconfiguredGeocoder)
        }
    };

    let image_store: Arc<dyn ImageStore> = match cfg.storage_backend {
        StorageBackend::Filesystem => {
            if let Err(e) = tokio::fs::create_dir_all(&cfg.uploads_dir).await {
                tracing::warn!(error = ?e, dir = %cfg.uploads_dir, "Failed to create uploads dir");
            }
            let prefix = match &cfg.public_base_url {
                Some(base) => format!("{base}{UPLOADS_ROUTE}"),
                None => UPLOADS_ROUTE.to_string(),
            };
            Arc::new(FsImageStore::new(&cfg.uploads_dir, prefix))
        }
        StorageBackend::S3 => Arc::new(S3ImageStore::new(cfg).await?),
    };

    let services = match pool {
        Some(pool) => AppServices::new(
            Arc::new(SqlxListingRepository::new(pool.clone())),
            Arc::new(SqlxReviewRepository::new(pool.clone())),
            Arc::new(SqlxUserRepository::new(pool)),
            session_store,
            geocoder,
            image_store,
        ),
        None => {
            let store = Arc::new(MemoryStore::new());
            AppServices::new(
                store.clone(),
                store.clone(),
                store,
                session_store,
                geocoder,
                image_store,
            )
        }
    };
    Ok(services)
}

/// Periodically removes expired sessions until the runtime shuts down.
pub fn spawn_session_sweeper(
    store: Arc<dyn SessionStore>,
    every: std::time::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(n) => tracing::info!(purged = n, "expired_sessions_purged"),
                Err(e) => tracing::warn!(error = ?e, "expired_session_purge_failed"),
            }
        }
    })
}
