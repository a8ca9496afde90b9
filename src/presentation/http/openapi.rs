use utoipa::OpenApi;

use super::{error, health, listings, reviews, session, users, views};

#[derive(OpenApi)]
#[openapi(
    paths(
        listings::index,
        listings::new_form,
        listings::create,
        listings::show,
        listings::edit_form,
        listings::update,
        listings::destroy,
        reviews::create,
        reviews::destroy,
        users::signup_form,
        users::signup,
        users::login_form,
        users::login,
        users::logout,
        health::health,
    ),
    components(schemas(
        views::IndexPage,
        views::ShowPage,
        views::FormPage,
        views::IndexData,
        views::ShowData,
        views::FormData,
        views::FormField,
        views::ListingView,
        views::GeometryView,
        views::ImageView,
        views::ReviewView,
        views::UserView,
        session::Flashes,
        error::ErrorPage,
        health::HealthResp,
    )),
    tags(
        (name = "Listings", description = "Browse and manage listings"),
        (name = "Reviews", description = "Listing reviews"),
        (name = "Users", description = "Signup, login and logout"),
        (name = "Health", description = "System health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/listings",
            "/listings/new",
            "/listings/{id}",
            "/listings/{id}/edit",
            "/listings/{id}/reviews",
            "/listings/{id}/reviews/{review_id}",
            "/signup",
            "/login",
            "/logout",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
