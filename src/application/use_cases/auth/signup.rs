use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::application::error::{AppError, AppResult};
use crate::application::ports::user_repository::UserRepository;
use crate::application::validation::{RawPayload, SignupForm};
use crate::domain::users::user::User;

pub const USERNAME_TAKEN: &str = "A user with the given username is already registered";

pub struct Signup<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> Signup<'a, R> {
    pub async fn execute(&self, raw: &RawPayload) -> AppResult<User> {
        let form = SignupForm::from_payload(raw)?;
        let hash = hash_password(&form.password)?;
        let row = self
            .repo
            .create_user(&form.username, &form.email, &hash)
            .await?
            .ok_or_else(|| AppError::Conflict(USERNAME_TAKEN.to_string()))?;
        tracing::info!(user_id = %row.id, username = %row.username, "user_registered");
        Ok(row.into())
    }
}

pub(crate) fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string())
}
