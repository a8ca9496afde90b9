use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::ports::listing_repository::{DeletedListing, ListingRepository};
use crate::application::ports::review_repository::ReviewRepository;
use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::domain::listings::listing::{Listing, ListingChanges, NewListing};
use crate::domain::reviews::review::Review;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRow>,
    listings: HashMap<Uuid, Listing>,
    // insertion order for listing scans
    listing_order: Vec<Uuid>,
    reviews: HashMap<Uuid, Review>,
}

// One lock over all records keeps two-sided review updates atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn review_count(&self) -> usize {
        self.tables.read().await.reviews.len()
    }
}

#[async_trait]
impl ListingRepository for MemoryStore {
    async fn list_all(&self) -> anyhow::Result<Vec<Listing>> {
        let t = self.tables.read().await;
        Ok(t.listing_order
            .iter()
            .filter_map(|id| t.listings.get(id).cloned())
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Listing>> {
        Ok(self.tables.read().await.listings.get(&id).cloned())
    }

    async fn owner_of(&self, id: Uuid) -> anyhow::Result<Option<Uuid>> {
        Ok(self.tables.read().await.listings.get(&id).map(|l| l.owner_id))
    }

    async fn insert(&self, listing: &NewListing) -> anyhow::Result<Listing> {
        let now = chrono::Utc::now();
        let row = Listing {
            id: Uuid::new_v4(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            location: listing.location.clone(),
            country: listing.country.clone(),
            price: listing.price,
            geometry: listing.geometry,
            image: listing.image.clone(),
            owner_id: listing.owner_id,
            review_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&listing.owner_id) {
            anyhow::bail!("owner {} does not exist", listing.owner_id);
        }
        t.listing_order.push(row.id);
        t.listings.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: &ListingChanges) -> anyhow::Result<Option<Listing>> {
        let mut t = self.tables.write().await;
        Ok(t.listings.get_mut(&id).map(|listing| {
            listing.apply(changes.clone());
            listing.clone()
        }))
    }

    async fn delete_cascade(&self, id: Uuid) -> anyhow::Result<Option<DeletedListing>> {
        let mut t = self.tables.write().await;
        let Some(listing) = t.listings.remove(&id) else {
            return Ok(None);
        };
        t.listing_order.retain(|x| *x != id);
        for review_id in &listing.review_ids {
            t.reviews.remove(review_id);
        }
        Ok(Some(DeletedListing {
            image: listing.image,
            review_count: listing.review_ids.len(),
        }))
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn create_for_listing(
        &self,
        listing_id: Uuid,
        author_id: Uuid,
        rating: i16,
        comment: &str,
    ) -> anyhow::Result<Option<Review>> {
        let mut guard = self.tables.write().await;
        let t = &mut *guard;
        if !t.users.contains_key(&author_id) {
            anyhow::bail!("author {author_id} does not exist");
        }
        let Some(listing) = t.listings.get_mut(&listing_id) else {
            return Ok(None);
        };
        let review = Review {
            id: Uuid::new_v4(),
            listing_id,
            rating,
            comment: comment.to_string(),
            author_id,
            created_at: chrono::Utc::now(),
        };
        listing.review_ids.push(review.id);
        t.reviews.insert(review.id, review.clone());
        Ok(Some(review))
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Review>> {
        Ok(self.tables.read().await.reviews.get(&id).cloned())
    }

    async fn list_for_listing(&self, listing_id: Uuid) -> anyhow::Result<Vec<Review>> {
        let t = self.tables.read().await;
        let Some(listing) = t.listings.get(&listing_id) else {
            return Ok(Vec::new());
        };
        Ok(listing
            .review_ids
            .iter()
            .filter_map(|id| t.reviews.get(id).cloned())
            .collect())
    }

    async fn detach_and_delete(&self, listing_id: Uuid, review_id: Uuid) -> anyhow::Result<bool> {
        let mut guard = self.tables.write().await;
        let t = &mut *guard;
        let Some(listing) = t.listings.get_mut(&listing_id) else {
            return Ok(false);
        };
        let before = listing.review_ids.len();
        listing.review_ids.retain(|id| *id != review_id);
        if listing.review_ids.len() == before {
            return Ok(false);
        }
        t.reviews.remove(&review_id);
        Ok(true)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<UserRow>> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.username == username) {
            return Ok(None);
        }
        let row = UserRow {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: Some(password_hash.to_string()),
        };
        t.users.insert(row.id, row.clone());
        Ok(Some(row))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>> {
        let t = self.tables.read().await;
        Ok(t.users.get(&id).map(|u| UserRow {
            password_hash: None,
            ..u.clone()
        }))
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<UserRow>> {
        let t = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| t.users.get(id))
            .map(|u| UserRow {
                password_hash: None,
                ..u.clone()
            })
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::listings::listing::{GeoPoint, ImageRef};

    pub async fn user(store: &MemoryStore, name: &str) -> crate::domain::users::user::User {
        store
            .create_user(name, &format!("{name}@example.com"), "hash")
            .await
            .unwrap()
            .unwrap()
            .into()
    }

    pub fn new_listing(owner_id: Uuid) -> NewListing {
        NewListing {
            title: "Mountain Retreat".into(),
            description: "Quiet cabin".into(),
            location: "Aspen".into(),
            country: "United States".into(),
            price: 1000,
            geometry: GeoPoint::new(-106.8, 39.2).unwrap(),
            image: ImageRef {
                url: "/uploads/cabin.png".into(),
                key: "cabin.png".into(),
            },
            owner_id,
        }
    }
}
