use uuid::Uuid;

use crate::application::error::{AppError, AppResult};
use crate::application::ports::listing_repository::ListingRepository;
use crate::application::ports::review_repository::ReviewRepository;
use crate::domain::users::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Granted,
    Denied,
    NotFound,
}

// The presentation layer resolves the principal from the session; this
// module only compares references.

pub async fn is_owner<R>(repo: &R, principal: Option<&User>, listing_id: Uuid) -> anyhow::Result<Decision>
where
    R: ListingRepository + ?Sized,
{
    let Some(owner_id) = repo.owner_of(listing_id).await? else {
        return Ok(Decision::NotFound);
    };
    Ok(match principal {
        Some(user) if user.id == owner_id => Decision::Granted,
        _ => Decision::Denied,
    })
}

/// A review only counts as found when it hangs off `listing_id`.
pub async fn is_author<R>(
    repo: &R,
    principal: Option<&User>,
    listing_id: Uuid,
    review_id: Uuid,
) -> anyhow::Result<Decision>
where
    R: ReviewRepository + ?Sized,
{
    let review = match repo.get_by_id(review_id).await? {
        Some(r) if r.listing_id == listing_id => r,
        _ => return Ok(Decision::NotFound),
    };
    Ok(match principal {
        Some(user) if review.is_written_by(user.id) => Decision::Granted,
        _ => Decision::Denied,
    })
}

pub async fn require_owner<R>(repo: &R, principal: Option<&User>, listing_id: Uuid) -> AppResult<()>
where
    R: ListingRepository + ?Sized,
{
    match is_owner(repo, principal, listing_id).await? {
        Decision::Granted => Ok(()),
        Decision::Denied => {
            tracing::info!(listing_id = %listing_id, "listing_mutation_denied");
            Err(AppError::denied(
                "You don't have permission to edit this listing.",
                format!("/listings/{listing_id}"),
            ))
        }
        Decision::NotFound => Err(AppError::NotFound("Listing")),
    }
}

pub async fn require_author<R>(
    repo: &R,
    principal: Option<&User>,
    listing_id: Uuid,
    review_id: Uuid,
) -> AppResult<()>
where
    R: ReviewRepository + ?Sized,
{
    match is_author(repo, principal, listing_id, review_id).await? {
        Decision::Granted => Ok(()),
        Decision::Denied => {
            tracing::info!(listing_id = %listing_id, review_id = %review_id, "review_mutation_denied");
            Err(AppError::denied(
                "You are not the author of this review.",
                format!("/listings/{listing_id}"),
            ))
        }
        Decision::NotFound => Err(AppError::NotFound("Review")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::MemoryStore;
    use crate::infrastructure::memory::fixtures::{new_listing, user};

    #[tokio::test]
    async fn ownership_compares_principal_to_stored_owner() {
        let store = MemoryStore::new();
        let owner = user(&store, "host").await;
        let other = user(&store, "other").await;
        let listing = store.insert(&new_listing(owner.id)).await.unwrap();

        assert_eq!(is_owner(&store, Some(&owner), listing.id).await.unwrap(), Decision::Granted);
        assert_eq!(is_owner(&store, Some(&other), listing.id).await.unwrap(), Decision::Denied);
        assert_eq!(is_owner(&store, None, listing.id).await.unwrap(), Decision::Denied);
        assert_eq!(
            is_owner(&store, Some(&owner), Uuid::new_v4()).await.unwrap(),
            Decision::NotFound
        );
    }

    #[tokio::test]
    async fn authorship_is_scoped_to_the_listing() {
        let store = MemoryStore::new();
        let owner = user(&store, "host").await;
        let guest = user(&store, "guest").await;
        let listing = store.insert(&new_listing(owner.id)).await.unwrap();
        let review = store
            .create_for_listing(listing.id, guest.id, 4, "good")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            is_author(&store, Some(&guest), listing.id, review.id).await.unwrap(),
            Decision::Granted
        );
        assert_eq!(
            is_author(&store, Some(&owner), listing.id, review.id).await.unwrap(),
            Decision::Denied
        );
        assert_eq!(
            is_author(&store, Some(&guest), Uuid::new_v4(), review.id).await.unwrap(),
            Decision::NotFound
        );
    }

    #[tokio::test]
    async fn require_owner_maps_decisions_to_errors() {
        let store = MemoryStore::new();
        let owner = user(&store, "host").await;
        let listing = store.insert(&new_listing(owner.id)).await.unwrap();

        assert!(require_owner(&store, Some(&owner), listing.id).await.is_ok());
        match require_owner(&store, None, listing.id).await {
            Err(AppError::Denied { redirect_to, .. }) => {
                assert_eq!(redirect_to, format!("/listings/{}", listing.id))
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            require_owner(&store, Some(&owner), Uuid::new_v4()).await,
            Err(AppError::NotFound("Listing"))
        ));
    }
}
