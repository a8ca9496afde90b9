use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::error::AppError;

use super::session::SessionEffects;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorPage {
    pub view: String,
    pub status: u16,
    pub message: String,
}

pub(crate) fn error_page(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorPage {
        view: "error".into(),
        status: status.as_u16(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

/// 303 to `location`, with session effects for the middleware to apply.
fn redirect_with(location: &str, effects: SessionEffects) -> Response {
    let mut res = (StatusCode::SEE_OTHER, [(header::LOCATION, location.to_string())]).into_response();
    res.extensions_mut().insert(effects);
    res
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                tracing::debug!(fields = errors.errors().len(), "validation_failed");
                error_page(StatusCode::BAD_REQUEST, errors.to_string())
            }
            AppError::Unauthenticated { return_to } => {
                let message = AppError::Unauthenticated { return_to: None }.to_string();
                redirect_with(
                    "/login",
                    SessionEffects {
                        flash_error: Some(message),
                        return_to,
                    },
                )
            }
            AppError::Denied {
                message,
                redirect_to,
            } => redirect_with(
                &redirect_to,
                SessionEffects {
                    flash_error: Some(message),
                    return_to: None,
                },
            ),
            err @ AppError::NotFound(_) => error_page(StatusCode::NOT_FOUND, err.to_string()),
            AppError::Conflict(message) => error_page(StatusCode::CONFLICT, message),
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "request_failed");
                error_page(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
        }
    }
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Page")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::validation::ValidationErrors;

    #[test]
    fn status_codes_follow_the_error_kind() {
        let cases = [
            (
                AppError::from(ValidationErrors::single("x", "\"x\" is required")),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::NotFound("Listing"), StatusCode::NOT_FOUND),
            (AppError::Conflict("taken".into()), StatusCode::CONFLICT),
            (
                AppError::Internal(anyhow::anyhow!("db down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Unauthenticated { return_to: None },
                StatusCode::SEE_OTHER,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn denial_redirects_and_carries_the_flash() {
        let res = AppError::denied("nope", "/listings/1").into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/listings/1");
        let effects = res.extensions().get::<SessionEffects>().unwrap();
        assert_eq!(effects.flash_error.as_deref(), Some("nope"));
    }
}
