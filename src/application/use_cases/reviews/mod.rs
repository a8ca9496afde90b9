pub mod create_review;
pub mod delete_review;
