use std::sync::Arc;

use crate::application::ports::geocoder::Geocoder;
use crate::application::ports::image_store::ImageStore;
use crate::application::ports::listing_repository::ListingRepository;
use crate::application::ports::review_repository::ReviewRepository;
use crate::application::ports::session_store::SessionStore;
use crate::application::ports::user_repository::UserRepository;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    listing_repo: Arc<dyn ListingRepository>,
    review_repo: Arc<dyn ReviewRepository>,
    user_repo: Arc<dyn UserRepository>,
    session_store: Arc<dyn SessionStore>,
    geocoder: Arc<dyn Geocoder>,
    image_store: Arc<dyn ImageStore>,
}

impl AppServices {
    pub fn new(
        listing_repo: Arc<dyn ListingRepository>,
        review_repo: Arc<dyn ReviewRepository>,
        user_repo: Arc<dyn UserRepository>,
        session_store: Arc<dyn SessionStore>,
        geocoder: Arc<dyn Geocoder>,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            listing_repo,
            review_repo,
            user_repo,
            session_store,
            geocoder,
            image_store,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn listing_repo(&self) -> Arc<dyn ListingRepository> {
        self.services.listing_repo.clone()
    }

    pub fn review_repo(&self) -> Arc<dyn ReviewRepository> {
        self.services.review_repo.clone()
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        self.services.session_store.clone()
    }

    pub fn geocoder(&self) -> Arc<dyn Geocoder> {
        self.services.geocoder.clone()
    }

    pub fn image_store(&self) -> Arc<dyn ImageStore> {
        self.services.image_store.clone()
    }
}
