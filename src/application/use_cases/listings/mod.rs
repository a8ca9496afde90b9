pub mod create_listing;
pub mod delete_listing;
pub mod get_listing;
pub mod list_listings;
pub mod update_listing;

use crate::application::error::{AppError, AppResult};
use crate::application::ports::geocoder::Geocoder;
use crate::application::ports::image_store::{ImageStore, ImageUpload};
use crate::application::validation::image::{IMAGE_FIELD, validate_image};
use crate::application::validation::{ListingForm, RawPayload, ValidationErrors};
use crate::domain::listings::listing::GeoPoint;

/// Validates the text fields and the optional image together so the client
/// sees every problem at once.
pub(crate) fn validate_submission(
    raw: &RawPayload,
    image: Option<&ImageUpload>,
    image_required: bool,
    max_image_bytes: usize,
) -> Result<ListingForm, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let form = ListingForm::from_payload(raw).map_err(|e| errors.extend(e)).ok();
    match image {
        Some(upload) => {
            if let Err(e) = validate_image(upload, max_image_bytes) {
                errors.extend(e);
            }
        }
        None if image_required => errors.push(IMAGE_FIELD, "\"listing.image\" is required"),
        None => {}
    }
    match form {
        Some(form) if errors.is_empty() => Ok(form),
        _ => Err(errors),
    }
}

pub(crate) async fn resolve_location<G>(geocoder: &G, location: &str) -> AppResult<GeoPoint>
where
    G: Geocoder + ?Sized,
{
    let found = geocoder.forward(location).await.map_err(|err| {
        tracing::error!(error = ?err, location = %location, "geocoding_failed");
        AppError::Internal(err.context("geocoding failed"))
    })?;
    found.ok_or_else(|| {
        ValidationErrors::single("listing[location]", "Location could not be found").into()
    })
}

/// Best-effort removal of an image that no record references any more.
pub(crate) async fn release_image<I>(images: &I, key: &str)
where
    I: ImageStore + ?Sized,
{
    if let Err(err) = images.delete(key).await {
        tracing::warn!(image_key = %key, error = ?err, "failed to release stored image");
    }
}

#[cfg(test)]
pub(crate) mod test_doubles {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::application::ports::geocoder::Geocoder;
    use crate::application::ports::image_store::{ImageStore, ImageUpload};
    use crate::domain::listings::listing::{GeoPoint, ImageRef};

    /// Resolves only the places it was told about.
    #[derive(Default)]
    pub struct FixedGeocoder {
        pub places: HashMap<String, GeoPoint>,
        pub calls: Mutex<usize>,
    }

    impl FixedGeocoder {
        pub fn with(place: &str, lng: f64, lat: f64) -> Self {
            let mut places = HashMap::new();
            places.insert(place.to_string(), GeoPoint::new(lng, lat).unwrap());
            Self {
                places,
                calls: Mutex::new(0),
            }
        }

        pub fn add(mut self, place: &str, lng: f64, lat: f64) -> Self {
            self.places
                .insert(place.to_string(), GeoPoint::new(lng, lat).unwrap());
            self
        }

        pub fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn forward(&self, query: &str) -> anyhow::Result<Option<GeoPoint>> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.places.get(query).copied())
        }
    }

    /// Keeps uploaded bytes in a map keyed by a running counter.
    #[derive(Default)]
    pub struct RecordingImageStore {
        pub stored: Mutex<HashMap<String, Vec<u8>>>,
        next: Mutex<u32>,
    }

    impl RecordingImageStore {
        pub fn keys(&self) -> Vec<String> {
            let mut keys: Vec<String> = self.stored.lock().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        }
    }

    #[async_trait]
    impl ImageStore for RecordingImageStore {
        async fn store(&self, upload: &ImageUpload) -> anyhow::Result<ImageRef> {
            let mut next = self.next.lock().unwrap();
            *next += 1;
            let key = format!("img-{}", *next);
            self.stored
                .lock()
                .unwrap()
                .insert(key.clone(), upload.bytes.clone());
            Ok(ImageRef {
                url: format!("/uploads/{key}"),
                key,
            })
        }

        async fn delete(&self, key: &str) -> anyhow::Result<()> {
            self.stored.lock().unwrap().remove(key);
            Ok(())
        }
    }

    pub fn png(bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            filename: Some("photo.png".into()),
            content_type: Some("image/png".into()),
            bytes: bytes.to_vec(),
        }
    }

    pub fn listing_payload(title: &str, location: &str, price: &str) -> crate::application::validation::RawPayload {
        [
            ("listing[title]", title),
            ("listing[description]", "A lovely place to stay"),
            ("listing[location]", location),
            ("listing[country]", "Italy"),
            ("listing[price]", price),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
}
