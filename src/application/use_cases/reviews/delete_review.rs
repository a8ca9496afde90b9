use uuid::Uuid;

use crate::application::access;
use crate::application::error::{AppError, AppResult};
use crate::application::ports::review_repository::ReviewRepository;
use crate::domain::users::user::User;

pub struct DeleteReview<'a, R: ReviewRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ReviewRepository + ?Sized> DeleteReview<'a, R> {
    pub async fn execute(&self, principal: Option<&User>, listing_id: Uuid, review_id: Uuid) -> AppResult<()> {
        access::require_author(self.repo, principal, listing_id, review_id).await?;
        if !self.repo.detach_and_delete(listing_id, review_id).await? {
            return Err(AppError::NotFound("Review"));
        }
        tracing::info!(listing_id = %listing_id, review_id = %review_id, "review_deleted");
        Ok(())
    }
}
