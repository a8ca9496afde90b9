use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::geocoder::Geocoder;
use crate::domain::listings::listing::GeoPoint;

pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

/// Forward geocoding against the Mapbox places endpoint, first match only.
pub struct MapboxGeocoder {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<f64>,
}

impl MapboxGeocoder {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url_for(&self, query: &str) -> String {
        format!(
            "{}/geocoding/v5/mapbox.places/{}.json?access_token={}&limit=1",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.token)
        )
    }
}

fn first_point(body: FeatureCollection) -> anyhow::Result<Option<GeoPoint>> {
    let Some(feature) = body.features.into_iter().next() else {
        return Ok(None);
    };
    match feature.geometry.coordinates.as_slice() {
        [lng, lat, ..] => GeoPoint::new(*lng, *lat).map(Some),
        _ => anyhow::bail!("geocoder returned a feature without coordinates"),
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn forward(&self, query: &str) -> anyhow::Result<Option<GeoPoint>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }
        let resp = self
            .client
            .get(self.url_for(query))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("request failed: {e}"))?;
        if !resp.status().is_success() {
            anyhow::bail!("geocoder returned status {}", resp.status());
        }
        let body: FeatureCollection = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("failed to read body: {e}"))?;
        first_point(body)
    }
}
