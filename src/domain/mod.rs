pub mod listings;
pub mod reviews;
pub mod users;
