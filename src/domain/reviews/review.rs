use uuid::Uuid;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Clone)]
pub struct Review {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub author_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Review {
    pub fn is_written_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}
