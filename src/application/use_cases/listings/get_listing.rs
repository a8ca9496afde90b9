use std::collections::HashMap;

use uuid::Uuid;

use crate::application::error::{AppError, AppResult};
use crate::application::ports::listing_repository::ListingRepository;
use crate::application::ports::review_repository::ReviewRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::listings::listing::Listing;
use crate::domain::reviews::review::Review;
use crate::domain::users::user::User;

#[derive(Debug, Clone)]
pub struct ReviewWithAuthor {
    pub review: Review,
    /// None when the author account no longer exists.
    pub author: Option<User>,
}

/// A listing with its owner and review authors resolved for display.
#[derive(Debug, Clone)]
pub struct ListingDetails {
    pub listing: Listing,
    pub owner: Option<User>,
    pub reviews: Vec<ReviewWithAuthor>,
}

pub struct GetListing<'a, L, R, U>
where
    L: ListingRepository + ?Sized,
    R: ReviewRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub listings: &'a L,
    pub reviews: &'a R,
    pub users: &'a U,
}

impl<'a, L, R, U> GetListing<'a, L, R, U>
where
    L: ListingRepository + ?Sized,
    R: ReviewRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub async fn execute(&self, id: Uuid) -> AppResult<ListingDetails> {
        let listing = self
            .listings
            .get_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Listing"))?;
        let reviews = self.reviews.list_for_listing(id).await?;

        let mut ids: Vec<Uuid> = reviews.iter().map(|r| r.author_id).collect();
        ids.push(listing.owner_id);
        ids.sort();
        ids.dedup();
        let people: HashMap<Uuid, User> = self
            .users
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|row| (row.id, User::from(row)))
            .collect();

        let owner = people.get(&listing.owner_id).cloned();
        let reviews = reviews
            .into_iter()
            .map(|review| ReviewWithAuthor {
                author: people.get(&review.author_id).cloned(),
                review,
            })
            .collect();
        Ok(ListingDetails {
            listing,
            owner,
            reviews,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::MemoryStore;
    use crate::infrastructure::memory::fixtures::{new_listing, user};

    #[tokio::test]
    async fn resolves_owner_and_review_authors_in_order() {
        let store = MemoryStore::new();
        let owner = user(&store, "host").await;
        let guest = user(&store, "guest").await;
        let listing = store.insert(&new_listing(owner.id)).await.unwrap();
        store
            .create_for_listing(listing.id, guest.id, 5, "Wonderful")
            .await
            .unwrap();
        store
            .create_for_listing(listing.id, owner.id, 3, "Self review")
            .await
            .unwrap();

        let details = GetListing {
            listings: &store,
            reviews: &store,
            users: &store,
        }
        .execute(listing.id)
        .await
        .unwrap();

        assert_eq!(details.owner.as_ref().map(|u| u.username.as_str()), Some("host"));
        let authors: Vec<&str> = details
            .reviews
            .iter()
            .map(|r| r.author.as_ref().unwrap().username.as_str())
            .collect();
        assert_eq!(authors, vec!["guest", "host"]);
        assert_eq!(details.reviews[0].review.comment, "Wonderful");
    }

    #[tokio::test]
    async fn unknown_listing_is_not_found() {
        let store = MemoryStore::new();
        let err = GetListing {
            listings: &store,
            reviews: &store,
            users: &store,
        }
        .execute(Uuid::new_v4())
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Listing not found");
    }
}
