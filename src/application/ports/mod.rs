pub mod geocoder;
pub mod image_store;
pub mod listing_repository;
pub mod review_repository;
pub mod session_store;
pub mod user_repository;
