use uuid::Uuid;

/// A user as seen outside the persistence and auth boundary. Carries no
/// credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}
