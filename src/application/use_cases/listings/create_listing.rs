use crate::application::error::AppResult;
use crate::application::ports::geocoder::Geocoder;
use crate::application::ports::image_store::{ImageStore, ImageUpload};
use crate::application::ports::listing_repository::ListingRepository;
use crate::application::validation::image::IMAGE_FIELD;
use crate::application::validation::{RawPayload, ValidationErrors};
use crate::domain::listings::listing::{Listing, NewListing};
use crate::domain::users::user::User;

use super::{release_image, resolve_location, validate_submission};

pub struct CreateListing<'a, L, G, I>
where
    L: ListingRepository + ?Sized,
    G: Geocoder + ?Sized,
    I: ImageStore + ?Sized,
{
    pub listings: &'a L,
    pub geocoder: &'a G,
    pub images: &'a I,
    pub max_image_bytes: usize,
}

impl<'a, L, G, I> CreateListing<'a, L, G, I>
where
    L: ListingRepository + ?Sized,
    G: Geocoder + ?Sized,
    I: ImageStore + ?Sized,
{
    pub async fn execute(
        &self,
        owner: &User,
        raw: &RawPayload,
        image: Option<ImageUpload>,
    ) -> AppResult<Listing> {
        let form = validate_submission(raw, image.as_ref(), true, self.max_image_bytes)?;
        let upload = image.ok_or_else(|| {
            ValidationErrors::single(IMAGE_FIELD, "\"listing.image\" is required")
        })?;

        let geometry = resolve_location(self.geocoder, &form.location).await?;

        let stored = self.images.store(&upload).await.map_err(|err| {
            tracing::error!(error = ?err, owner_id = %owner.id, "image_store_failed");
            err.context("image upload failed")
        })?;

        let new = NewListing {
            title: form.title,
            description: form.description,
            location: form.location,
            country: form.country,
            price: form.price,
            geometry,
            image: stored.clone(),
            owner_id: owner.id,
        };
        match self.listings.insert(&new).await {
            Ok(listing) => {
                tracing::info!(listing_id = %listing.id, owner_id = %owner.id, "listing_created");
                Ok(listing)
            }
            Err(err) => {
                tracing::error!(error = ?err, owner_id = %owner.id, "listing_insert_failed");
                release_image(self.images, &stored.key).await;
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::application::error::AppError;
    use crate::application::ports::listing_repository::DeletedListing;
    use crate::application::use_cases::listings::test_doubles::*;
    use crate::domain::listings::listing::ListingChanges;
    use crate::infrastructure::memory::MemoryStore;
    use crate::infrastructure::memory::fixtures::user;

    #[tokio::test]
    async fn persists_owner_geometry_and_image() {
        let store = MemoryStore::new();
        let owner = user(&store, "host").await;
        let geocoder = FixedGeocoder::with("Florence", 11.25, 43.77);
        let images = RecordingImageStore::default();
        let uc = CreateListing {
            listings: &store,
            geocoder: &geocoder,
            images: &images,
            max_image_bytes: 1024,
        };

        let listing = uc
            .execute(&owner, &listing_payload("Tuscan Villa", "Florence", "2500"), Some(png(b"px")))
            .await
            .unwrap();

        assert_eq!(listing.owner_id, owner.id);
        assert_eq!(listing.geometry.coordinates(), [11.25, 43.77]);
        assert_eq!(listing.image.key, "img-1");

        let fetched = ListingRepository::get_by_id(&store, listing.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.title, "Tuscan Villa");
        assert_eq!(fetched.description, "A lovely place to stay");
        assert_eq!(fetched.price, 2500);
        assert_eq!(fetched.geometry, listing.geometry);
        assert_eq!(fetched.image, listing.image);
    }

    #[tokio::test]
    async fn invalid_payload_touches_nothing_external() {
        let store = MemoryStore::new();
        let owner = user(&store, "host").await;
        let geocoder = FixedGeocoder::with("Florence", 11.25, 43.77);
        let images = RecordingImageStore::default();
        let uc = CreateListing {
            listings: &store,
            geocoder: &geocoder,
            images: &images,
            max_image_bytes: 1024,
        };

        let bad_image = ImageUpload {
            filename: Some("doc.pdf".into()),
            content_type: None,
            bytes: b"%PDF".to_vec(),
        };
        let err = uc
            .execute(&owner, &listing_payload("", "Florence", "10"), Some(bad_image))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(v) => assert_eq!(
                v.to_string(),
                "\"listing.title\" is required, \"listing.image\" must be one of png, jpeg, jpg, svg"
            ),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(geocoder.call_count(), 0);
        assert!(images.keys().is_empty());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn image_is_required_on_create() {
        let store = MemoryStore::new();
        let owner = user(&store, "host").await;
        let geocoder = FixedGeocoder::default();
        let images = RecordingImageStore::default();
        let uc = CreateListing {
            listings: &store,
            geocoder: &geocoder,
            images: &images,
            max_image_bytes: 1024,
        };
        let err = uc
            .execute(&owner, &listing_payload("Hut", "Nowhere", "1"), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "\"listing.image\" is required");
    }

    #[tokio::test]
    async fn unknown_location_is_a_client_error() {
        let store = MemoryStore::new();
        let owner = user(&store, "host").await;
        let geocoder = FixedGeocoder::default();
        let images = RecordingImageStore::default();
        let uc = CreateListing {
            listings: &store,
            geocoder: &geocoder,
            images: &images,
            max_image_bytes: 1024,
        };
        let err = uc
            .execute(&owner, &listing_payload("Hut", "Atlantis", "1"), Some(png(b"x")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.to_string(), "Location could not be found");
        assert!(images.keys().is_empty());
    }

    struct FailingListings;

    #[async_trait]
    impl ListingRepository for FailingListings {
        async fn list_all(&self) -> anyhow::Result<Vec<Listing>> {
            Ok(vec![])
        }
        async fn get_by_id(&self, _id: Uuid) -> anyhow::Result<Option<Listing>> {
            Ok(None)
        }
        async fn owner_of(&self, _id: Uuid) -> anyhow::Result<Option<Uuid>> {
            Ok(None)
        }
        async fn insert(&self, _listing: &NewListing) -> anyhow::Result<Listing> {
            anyhow::bail!("connection reset")
        }
        async fn update(&self, _id: Uuid, _c: &ListingChanges) -> anyhow::Result<Option<Listing>> {
            Ok(None)
        }
        async fn delete_cascade(&self, _id: Uuid) -> anyhow::Result<Option<DeletedListing>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn failed_insert_releases_the_stored_image() {
        let geocoder = FixedGeocoder::with("Florence", 11.25, 43.77);
        let images = RecordingImageStore::default();
        let uc = CreateListing {
            listings: &FailingListings,
            geocoder: &geocoder,
            images: &images,
            max_image_bytes: 1024,
        };
        let owner = User {
            id: Uuid::new_v4(),
            username: "host".into(),
            email: "h@example.com".into(),
        };
        let err = uc
            .execute(&owner, &listing_payload("Villa", "Florence", "1"), Some(png(b"x")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(images.keys().is_empty());
    }
}
