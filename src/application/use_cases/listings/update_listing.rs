use uuid::Uuid;

use crate::application::access;
use crate::application::error::{AppError, AppResult};
use crate::application::ports::geocoder::Geocoder;
use crate::application::ports::image_store::{ImageStore, ImageUpload};
use crate::application::ports::listing_repository::ListingRepository;
use crate::application::validation::RawPayload;
use crate::domain::listings::listing::{Listing, ListingChanges};
use crate::domain::users::user::User;

use super::{release_image, resolve_location, validate_submission};

pub struct UpdateListing<'a, L, G, I>
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

impl<'a, L, G, I> UpdateListing<'a, L, G, I>
where
    L: ListingRepository + ?Sized,
    G: Geocoder + ?Sized,
    I: ImageStore + ?Sized,
{
    /// Replaces the editable fields. The image is swapped only when a new one
    /// is supplied; the location is geocoded again only when its text changed.
    pub async fn execute(
        &self,
        principal: Option<&User>,
        id: Uuid,
        raw: &RawPayload,
        image: Option<ImageUpload>,
    ) -> AppResult<Listing> {
        access::require_owner(self.listings, principal, id).await?;
        let form = validate_submission(raw, image.as_ref(), false, self.max_image_bytes)?;

        let current = self
            .listings
            .get_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Listing"))?;

        let geometry = if form.location != current.location {
            Some(resolve_location(self.geocoder, &form.location).await?)
        } else {
            None
        };

        let new_image = match image {
            Some(upload) => Some(self.images.store(&upload).await.map_err(|err| {
                tracing::error!(error = ?err, listing_id = %id, "image_store_failed");
                err.context("image upload failed")
            })?),
            None => None,
        };

        let changes = ListingChanges {
            title: form.title,
            description: form.description,
            location: form.location,
            country: form.country,
            price: form.price,
            geometry,
            image: new_image.clone(),
        };
        let updated = match self.listings.update(id, &changes).await {
            Ok(Some(listing)) => listing,
            outcome => {
                if let Some(stored) = &new_image {
                    release_image(self.images, &stored.key).await;
                }
                return match outcome {
                    Err(err) => Err(err.into()),
                    _ => Err(AppError::NotFound("Listing")),
                };
            }
        };

        if new_image.is_some() && current.image.key != updated.image.key {
            release_image(self.images, &current.image.key).await;
        }
        tracing::info!(listing_id = %id, relocated = changes.geometry.is_some(), "listing_updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::listings::create_listing::CreateListing;
    use crate::application::use_cases::listings::test_doubles::*;
    use crate::infrastructure::memory::MemoryStore;
    use crate::infrastructure::memory::fixtures::user;

    async fn seeded(
        store: &MemoryStore,
        geocoder: &FixedGeocoder,
        images: &RecordingImageStore,
        owner: &User,
    ) -> Listing {
        CreateListing {
            listings: store,
            geocoder,
            images,
            max_image_bytes: 1024,
        }
        .execute(owner, &listing_payload("Villa", "Florence", "100"), Some(png(b"v1")))
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn owner_can_edit_without_new_image_or_regeocoding() {
        let store = MemoryStore::new();
        let owner = user(&store, "host").await;
        let geocoder = FixedGeocoder::with("Florence", 11.25, 43.77);
        let images = RecordingImageStore::default();
        let listing = seeded(&store, &geocoder, &images, &owner).await;
        assert_eq!(geocoder.call_count(), 1);

        let updated = UpdateListing {
            listings: &store,
            geocoder: &geocoder,
            images: &images,
            max_image_bytes: 1024,
        }
        .execute(
            Some(&owner),
            listing.id,
            &listing_payload("Villa Rosa", "Florence", "150"),
            None,
        )
        .await
        .unwrap();

        assert_eq!(updated.title, "Villa Rosa");
        assert_eq!(updated.price, 150);
        assert_eq!(updated.image, listing.image);
        assert_eq!(updated.geometry, listing.geometry);
        assert_eq!(geocoder.call_count(), 1);
    }

    #[tokio::test]
    async fn new_location_and_image_replace_the_old_ones() {
        let store = MemoryStore::new();
        let owner = user(&store, "host").await;
        let geocoder = FixedGeocoder::with("Florence", 11.25, 43.77).add("Rome", 12.5, 41.9);
        let images = RecordingImageStore::default();
        let listing = seeded(&store, &geocoder, &images, &owner).await;

        let updated = UpdateListing {
            listings: &store,
            geocoder: &geocoder,
            images: &images,
            max_image_bytes: 1024,
        }
        .execute(
            Some(&owner),
            listing.id,
            &listing_payload("Villa", "Rome", "100"),
            Some(png(b"v2")),
        )
        .await
        .unwrap();

        assert_eq!(updated.geometry.coordinates(), [12.5, 41.9]);
        assert_eq!(updated.image.key, "img-2");
        assert_eq!(images.keys(), vec!["img-2".to_string()]);
    }

    #[tokio::test]
    async fn non_owner_is_denied_and_nothing_changes() {
        let store = MemoryStore::new();
        let owner = user(&store, "host").await;
        let intruder = user(&store, "intruder").await;
        let geocoder = FixedGeocoder::with("Florence", 11.25, 43.77);
        let images = RecordingImageStore::default();
        let listing = seeded(&store, &geocoder, &images, &owner).await;

        let uc = UpdateListing {
            listings: &store,
            geocoder: &geocoder,
            images: &images,
            max_image_bytes: 1024,
        };
        for principal in [Some(&intruder), None] {
            let err = uc
                .execute(
                    principal,
                    listing.id,
                    &listing_payload("Hijacked", "Florence", "1"),
                    None,
                )
                .await
                .unwrap_err();
            match err {
                AppError::Denied {
                    message,
                    redirect_to,
                } => {
                    assert_eq!(message, "You don't have permission to edit this listing.");
                    assert_eq!(redirect_to, format!("/listings/{}", listing.id));
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        let stored = store.get_by_id(listing.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Villa");
    }

    #[tokio::test]
    async fn missing_listing_is_not_found() {
        let store = MemoryStore::new();
        let owner = user(&store, "host").await;
        let geocoder = FixedGeocoder::default();
        let images = RecordingImageStore::default();
        let err = UpdateListing {
            listings: &store,
            geocoder: &geocoder,
            images: &images,
            max_image_bytes: 1024,
        }
        .execute(
            Some(&owner),
            Uuid::new_v4(),
            &listing_payload("Villa", "Florence", "1"),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Listing")));
    }
}
