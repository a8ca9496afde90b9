use uuid::Uuid;

use crate::application::access;
use crate::application::error::{AppError, AppResult};
use crate::application::ports::image_store::ImageStore;
use crate::application::ports::listing_repository::ListingRepository;
use crate::domain::users::user::User;

use super::release_image;

pub struct DeleteListing<'a, L, I>
where
    L: ListingRepository + ?Sized,
    I: ImageStore + ?Sized,
{
    pub listings: &'a L,
    pub images: &'a I,
}

impl<'a, L, I> DeleteListing<'a, L, I>
where
    L: ListingRepository + ?Sized,
    I: ImageStore + ?Sized,
{
    /// Removes the listing together with every review it holds.
    pub async fn execute(&self, principal: Option<&User>, id: Uuid) -> AppResult<()> {
        access::require_owner(self.listings, principal, id).await?;
        let deleted = self
            .listings
            .delete_cascade(id)
            .await?
            .ok_or(AppError::NotFound("Listing"))?;
        release_image(self.images, &deleted.image.key).await;
        tracing::info!(listing_id = %id, reviews_removed = deleted.review_count, "listing_deleted");
        Ok(())
    }
}
