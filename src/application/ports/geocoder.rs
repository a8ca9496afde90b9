use async_trait::async_trait;

use crate::domain::listings::listing::GeoPoint;

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for a free-text place name, or None when nothing matched.
    async fn forward(&self, query: &str) -> anyhow::Result<Option<GeoPoint>>;
}
