pub mod mapbox;

use async_trait::async_trait;

use crate::application::ports::geocoder::Geocoder;
use crate::domain::listings::listing::GeoPoint;

/// Stand-in used when no map token is configured. Every lookup fails, so
/// listings cannot be created or relocated until a token is set.
pub struct UnconfiguredGeocoder;

#[async_trait]
impl Geocoder for UnconfiguredGeocoder {
    async fn forward(&self, _query: &str) -> anyhow::Result<Option<GeoPoint>> {
        anyhow::bail!("geocoding is not configured (MAP_TOKEN is unset)")
    }
}
