use crate::application::validation::ValidationErrors;

/// Failures a use case can surface to the request layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("You must be logged in to do that.")]
    Unauthenticated { return_to: Option<String> },

    #[error("{message}")]
    Denied { message: String, redirect_to: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn denied(message: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        AppError::Denied {
            message: message.into(),
            redirect_to: redirect_to.into(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
