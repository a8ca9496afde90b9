use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::reviews::review::Review;

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Inserts the review and appends its reference to the listing's
    /// collection. Returns None if the listing does not exist.
    async fn create_for_listing(
        &self,
        listing_id: Uuid,
        author_id: Uuid,
        rating: i16,
        comment: &str,
    ) -> anyhow::Result<Option<Review>>;

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Review>>;

    /// Reviews in the order the listing's collection holds them.
    async fn list_for_listing(&self, listing_id: Uuid) -> anyhow::Result<Vec<Review>>;

    /// Pulls the reference out of the listing's collection and deletes the
    /// review. Returns false when the review is not attached to that listing.
    async fn detach_and_delete(&self, listing_id: Uuid, review_id: Uuid) -> anyhow::Result<bool>;
}
