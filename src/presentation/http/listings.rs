use axum::{
    Json, Router,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    response::Redirect,
    routing::get,
};
use uuid::Uuid;

use crate::application::access;
use crate::application::error::{AppError, AppResult};
use crate::application::use_cases::listings::create_listing::CreateListing;
use crate::application::use_cases::listings::delete_listing::DeleteListing;
use crate::application::use_cases::listings::get_listing::GetListing;
use crate::application::use_cases::listings::list_listings::ListListings;
use crate::application::use_cases::listings::update_listing::UpdateListing;
use crate::application::validation::image::IMAGE_FIELD;
use crate::application::validation::{LISTING_SCHEMA, ValidationErrors};
use crate::bootstrap::app_context::AppContext;

use super::forms::{ListingSubmission, read_listing_form};
use super::session::RequestContext;
use super::views::{
    FormData, FormPage, ImageView, IndexData, IndexPage, ListingView, MULTIPART, Page, ShowData,
    ShowPage,
};

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/listings", get(index).post(create))
        .route("/listings/new", get(new_form))
        .route("/listings/:id", get(show).put(update).delete(destroy))
        .route("/listings/:id/edit", get(edit_form))
        .with_state(ctx)
}

/// Malformed ids can never match a record.
pub(crate) fn parse_id(raw: &str, what: &'static str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(what))
}

async fn submission(multipart: Result<Multipart, MultipartRejection>) -> AppResult<ListingSubmission> {
    match multipart {
        Ok(m) => read_listing_form(m).await,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "listing_form_rejected");
            Err(ValidationErrors::single("form", "The submitted form could not be read").into())
        }
    }
}

fn listing_form(action: String, image_required: bool) -> FormData {
    FormData::from_schema(&LISTING_SCHEMA, action, MULTIPART).with_file(
        IMAGE_FIELD,
        "listing.image",
        image_required,
    )
}

#[utoipa::path(get, path = "/listings", tag = "Listings", responses(
    (status = 200, body = IndexPage)
))]
pub async fn index(State(ctx): State<AppContext>, rc: RequestContext) -> AppResult<Json<IndexPage>> {
    let repo = ctx.listing_repo();
    let uc = ListListings {
        repo: repo.as_ref(),
    };
    let listings = uc.execute().await?;
    let data = IndexData {
        listings: listings.iter().map(ListingView::from).collect(),
    };
    Ok(Json(Page::render(&rc, "listings/index", data)))
}

#[utoipa::path(get, path = "/listings/new", tag = "Listings", responses(
    (status = 200, body = FormPage),
    (status = 303, description = "Login required")
))]
pub async fn new_form(rc: RequestContext) -> AppResult<Json<FormPage>> {
    rc.require_user()?;
    let form = listing_form("/listings".into(), true);
    Ok(Json(Page::render(&rc, "listings/new", form)))
}

#[utoipa::path(post, path = "/listings", tag = "Listings",
    request_body(content = String, content_type = "multipart/form-data", description = "listing[...] fields plus listing[image]"),
    responses(
        (status = 303, description = "Created; redirects to /listings"),
        (status = 400, body = super::error::ErrorPage)
    )
)]
pub async fn create(
    State(ctx): State<AppContext>,
    rc: RequestContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Redirect> {
    let owner = rc.require_user()?;
    let form = submission(multipart).await?;
    let listings = ctx.listing_repo();
    let geocoder = ctx.geocoder();
    let images = ctx.image_store();
    let uc = CreateListing {
        listings: listings.as_ref(),
        geocoder: geocoder.as_ref(),
        images: images.as_ref(),
        max_image_bytes: ctx.cfg.upload_max_bytes,
    };
    uc.execute(owner, &form.fields, form.image).await?;
    rc.session.flash_success("New listing created!");
    Ok(Redirect::to("/listings"))
}

#[utoipa::path(get, path = "/listings/{id}", tag = "Listings",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, body = ShowPage),
        (status = 404, body = super::error::ErrorPage)
    )
)]
pub async fn show(
    State(ctx): State<AppContext>,
    rc: RequestContext,
    Path(id): Path<String>,
) -> AppResult<Json<ShowPage>> {
    let id = parse_id(&id, "Listing")?;
    let listings = ctx.listing_repo();
    let reviews = ctx.review_repo();
    let users = ctx.user_repo();
    let uc = GetListing {
        listings: listings.as_ref(),
        reviews: reviews.as_ref(),
        users: users.as_ref(),
    };
    let details = uc.execute(id).await?;
    let data = ShowData::new(&details, rc.user.as_ref());
    Ok(Json(Page::render(&rc, "listings/show", data)))
}

#[utoipa::path(get, path = "/listings/{id}/edit", tag = "Listings",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 200, body = FormPage),
        (status = 303, description = "Login required or not the owner"),
        (status = 404, body = super::error::ErrorPage)
    )
)]
pub async fn edit_form(
    State(ctx): State<AppContext>,
    rc: RequestContext,
    Path(id): Path<String>,
) -> AppResult<Json<FormPage>> {
    let user = rc.require_user()?;
    let id = parse_id(&id, "Listing")?;
    let repo = ctx.listing_repo();
    access::require_owner(repo.as_ref(), Some(user), id).await?;
    let listing = repo
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Listing"))?;

    let mut form = listing_form(format!("/listings/{id}?_method=PUT"), false).with_values([
        ("listing[title]", listing.title.clone()),
        ("listing[description]", listing.description.clone()),
        ("listing[location]", listing.location.clone()),
        ("listing[country]", listing.country.clone()),
        ("listing[price]", listing.price.to_string()),
    ]);
    form.current_image = Some(ImageView {
        url: listing.image.url.clone(),
        filename: listing.image.key.clone(),
    });
    Ok(Json(Page::render(&rc, "listings/edit", form)))
}

#[utoipa::path(put, path = "/listings/{id}", tag = "Listings",
    params(("id" = Uuid, Path, description = "Listing id")),
    request_body(content = String, content_type = "multipart/form-data", description = "listing[...] fields, optional listing[image]"),
    responses(
        (status = 303, description = "Updated, or denied with a flash"),
        (status = 400, body = super::error::ErrorPage),
        (status = 404, body = super::error::ErrorPage)
    )
)]
pub async fn update(
    State(ctx): State<AppContext>,
    rc: RequestContext,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Redirect> {
    let user = rc.require_user()?;
    let id = parse_id(&id, "Listing")?;
    let listings = ctx.listing_repo();
    // ownership before reading the body
    access::require_owner(listings.as_ref(), Some(user), id).await?;
    let form = submission(multipart).await?;
    let geocoder = ctx.geocoder();
    let images = ctx.image_store();
    let uc = UpdateListing {
        listings: listings.as_ref(),
        geocoder: geocoder.as_ref(),
        images: images.as_ref(),
        max_image_bytes: ctx.cfg.upload_max_bytes,
    };
    uc.execute(Some(user), id, &form.fields, form.image).await?;
    rc.session.flash_success("Listing updated!");
    Ok(Redirect::to(&format!("/listings/{id}")))
}

#[utoipa::path(delete, path = "/listings/{id}", tag = "Listings",
    params(("id" = Uuid, Path, description = "Listing id")),
    responses(
        (status = 303, description = "Deleted, or denied with a flash"),
        (status = 404, body = super::error::ErrorPage)
    )
)]
pub async fn destroy(
    State(ctx): State<AppContext>,
    rc: RequestContext,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    let user = rc.require_user()?;
    let id = parse_id(&id, "Listing")?;
    let listings = ctx.listing_repo();
    let images = ctx.image_store();
    let uc = DeleteListing {
        listings: listings.as_ref(),
        images: images.as_ref(),
    };
    uc.execute(Some(user), id).await?;
    rc.session.flash_success("Listing deleted!");
    Ok(Redirect::to("/listings"))
}
