use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::listings::listing::{ImageRef, Listing, ListingChanges, NewListing};

/// What a cascading listing delete removed.
#[derive(Debug, Clone)]
pub struct DeletedListing {
    pub image: ImageRef,
    pub review_count: usize,
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn list_all(&self) -> anyhow::Result<Vec<Listing>>;

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Listing>>;

    // Lightweight owner lookup for authorization
    async fn owner_of(&self, id: Uuid) -> anyhow::Result<Option<Uuid>>;

    async fn insert(&self, listing: &NewListing) -> anyhow::Result<Listing>;

    // Returns None when the listing no longer exists
    async fn update(&self, id: Uuid, changes: &ListingChanges) -> anyhow::Result<Option<Listing>>;

    // Removes the listing together with every review in its collection
    async fn delete_cascade(&self, id: Uuid) -> anyhow::Result<Option<DeletedListing>>;

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
