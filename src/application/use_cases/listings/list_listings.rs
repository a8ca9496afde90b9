use crate::application::ports::listing_repository::ListingRepository;
use crate::domain::listings::listing::Listing;

pub struct ListListings<'a, R: ListingRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ListingRepository + ?Sized> ListListings<'a, R> {
    pub async fn execute(&self) -> anyhow::Result<Vec<Listing>> {
        self.repo.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::MemoryStore;
    use crate::infrastructure::memory::fixtures::{new_listing, user};

    #[tokio::test]
    async fn returns_listings_in_insertion_order() {
        let store = MemoryStore::new();
        assert!(ListListings { repo: &store }.execute().await.unwrap().is_empty());

        let owner = user(&store, "host").await;
        let mut first = new_listing(owner.id);
        first.title = "First".into();
        let mut second = new_listing(owner.id);
        second.title = "Second".into();
        store.insert(&first).await.unwrap();
        store.insert(&second).await.unwrap();

        let titles: Vec<String> = ListListings { repo: &store }
            .execute()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.title)
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }
}
