use uuid::Uuid;

use crate::application::error::{AppError, AppResult};
use crate::application::ports::listing_repository::ListingRepository;
use crate::application::ports::review_repository::ReviewRepository;
use crate::application::validation::{RawPayload, ReviewForm};
use crate::domain::reviews::review::Review;
use crate::domain::users::user::User;

pub struct CreateReview<'a, L: ListingRepository + ?Sized, R: ReviewRepository + ?Sized> {
    pub listings: &'a L,
    pub repo: &'a R,
}

impl<'a, L, R> CreateReview<'a, L, R>
where
    L: ListingRepository + ?Sized,
    R: ReviewRepository + ?Sized,
{
    pub async fn execute(&self, author: &User, listing_id: Uuid, raw: &RawPayload) -> AppResult<Review> {
        if self.listings.owner_of(listing_id).await?.is_none() {
            return Err(AppError::NotFound("Listing"));
        }
        let form = ReviewForm::from_payload(raw)?;
        let review = self
            .repo
            .create_for_listing(listing_id, author.id, form.rating, &form.comment)
            .await?
            .ok_or(AppError::NotFound("Listing"))?;
        tracing::info!(listing_id = %listing_id, review_id = %review.id, author_id = %author.id, "review_created");
        Ok(review)
    }
}
