use axum::{
    Form, Router,
    extract::{Path, State, rejection::FormRejection},
    response::Redirect,
    routing::{delete, post},
};
use uuid::Uuid;

use crate::application::error::AppResult;
use crate::application::use_cases::reviews::create_review::CreateReview;
use crate::application::use_cases::reviews::delete_review::DeleteReview;
use crate::application::validation::{RawPayload, ValidationErrors};
use crate::bootstrap::app_context::AppContext;

use super::listings::parse_id;
use super::session::RequestContext;

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/listings/:id/reviews", post(create))
        .route("/listings/:id/reviews/:review_id", delete(destroy))
        .with_state(ctx)
}

pub(crate) fn form_payload(form: Result<Form<RawPayload>, FormRejection>) -> AppResult<RawPayload> {
    match form {
        Ok(Form(raw)) => Ok(raw),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "form_rejected");
            Err(ValidationErrors::single("form", "The submitted form could not be read").into())
        }
    }
}

#[utoipa::path(post, path = "/listings/{id}/reviews", tag = "Reviews",
    params(("id" = Uuid, Path, description = "Listing id")),
    request_body(content = String, content_type = "application/x-www-form-urlencoded", description = "review[rating], review[comment]"),
    responses(
        (status = 303, description = "Created; redirects to the listing"),
        (status = 400, body = super::error::ErrorPage),
        (status = 404, body = super::error::ErrorPage)
    )
)]
pub async fn create(
    State(ctx): State<AppContext>,
    rc: RequestContext,
    Path(id): Path<String>,
    form: Result<Form<RawPayload>, FormRejection>,
) -> AppResult<Redirect> {
    let author = rc.require_user()?;
    let listing_id = parse_id(&id, "Listing")?;
    let raw = form_payload(form)?;
    let listings = ctx.listing_repo();
    let repo = ctx.review_repo();
    let uc = CreateReview {
        listings: listings.as_ref(),
        repo: repo.as_ref(),
    };
    uc.execute(author, listing_id, &raw).await?;
    rc.session.flash_success("New review created!");
    Ok(Redirect::to(&format!("/listings/{listing_id}")))
}

#[utoipa::path(delete, path = "/listings/{id}/reviews/{review_id}", tag = "Reviews",
    params(
        ("id" = Uuid, Path, description = "Listing id"),
        ("review_id" = Uuid, Path, description = "Review id")
    ),
    responses(
        (status = 303, description = "Deleted, or denied with a flash"),
        (status = 404, body = super::error::ErrorPage)
    )
)]
pub async fn destroy(
    State(ctx): State<AppContext>,
    rc: RequestContext,
    Path((id, review_id)): Path<(String, String)>,
) -> AppResult<Redirect> {
    let user = rc.require_user()?;
    let listing_id = parse_id(&id, "Listing")?;
    let review_id = parse_id(&review_id, "Review")?;
    let repo = ctx.review_repo();
    let uc = DeleteReview {
        repo: repo.as_ref(),
    };
    uc.execute(Some(user), listing_id, review_id).await?;
    rc.session.flash_success("Review deleted!");
    Ok(Redirect::to(&format!("/listings/{listing_id}")))
}
