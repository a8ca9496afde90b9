pub mod listing_repository_sqlx;
pub mod review_repository_sqlx;
pub mod session_store_sqlx;
pub mod user_repository_sqlx;
