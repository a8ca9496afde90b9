use axum::{
    Form, Json, Router,
    extract::{State, rejection::FormRejection},
    response::Redirect,
    routing::get,
};

use crate::application::error::AppResult;
use crate::application::use_cases::auth::login::{Login, LoginRequest};
use crate::application::use_cases::auth::signup::Signup;
use crate::application::validation::{LOGIN_SCHEMA, RawPayload, SIGNUP_SCHEMA};
use crate::bootstrap::app_context::AppContext;

use super::reviews::form_payload;
use super::session::RequestContext;
use super::views::{FormData, FormPage, Page, URLENCODED};

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/signup", get(signup_form).post(signup))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
        .with_state(ctx)
}

/// Only same-site paths are honoured as post-login targets.
fn safe_return_to(url: Option<String>) -> Option<String> {
    url.filter(|u| u.starts_with('/') && !u.starts_with("//"))
}

#[utoipa::path(get, path = "/signup", tag = "Users", responses((status = 200, body = FormPage)))]
pub async fn signup_form(rc: RequestContext) -> Json<FormPage> {
    let form = FormData::from_schema(&SIGNUP_SCHEMA, "/signup", URLENCODED);
    Json(Page::render(&rc, "users/signup", form))
}

#[utoipa::path(post, path = "/signup", tag = "Users",
    request_body(content = String, content_type = "application/x-www-form-urlencoded", description = "username, email, password"),
    responses(
        (status = 303, description = "Registered and logged in"),
        (status = 400, body = super::error::ErrorPage),
        (status = 409, body = super::error::ErrorPage)
    )
)]
pub async fn signup(
    State(ctx): State<AppContext>,
    rc: RequestContext,
    form: Result<Form<RawPayload>, FormRejection>,
) -> AppResult<Redirect> {
    let raw = form_payload(form)?;
    let repo = ctx.user_repo();
    let uc = Signup {
        repo: repo.as_ref(),
    };
    let user = uc.execute(&raw).await?;
    rc.session.login(user.id);
    rc.session.flash_success("Welcome to Wanderlust!");
    Ok(Redirect::to("/listings"))
}

#[utoipa::path(get, path = "/login", tag = "Users", responses((status = 200, body = FormPage)))]
pub async fn login_form(rc: RequestContext) -> Json<FormPage> {
    let form = FormData::from_schema(&LOGIN_SCHEMA, "/login", URLENCODED);
    Json(Page::render(&rc, "users/login", form))
}

#[utoipa::path(post, path = "/login", tag = "Users",
    request_body(content = String, content_type = "application/x-www-form-urlencoded", description = "username, password"),
    responses((status = 303, description = "Redirects to the saved page or /listings; back to /login on failure"))
)]
pub async fn login(
    State(ctx): State<AppContext>,
    rc: RequestContext,
    form: Result<Form<RawPayload>, FormRejection>,
) -> AppResult<Redirect> {
    let mut raw = form_payload(form)?;
    let req = LoginRequest {
        username: raw.remove("username").unwrap_or_default(),
        password: raw.remove("password").unwrap_or_default(),
    };
    let repo = ctx.user_repo();
    let uc = Login {
        repo: repo.as_ref(),
    };
    let Some(user) = uc.execute(&req).await? else {
        tracing::info!(username = %req.username.trim(), "login_failed");
        rc.session.flash_error("Invalid username or password.");
        return Ok(Redirect::to("/login"));
    };
    let target = safe_return_to(rc.session.take_return_to()).unwrap_or_else(|| "/listings".into());
    rc.session.login(user.id);
    rc.session.flash_success("Welcome back to Wanderlust!");
    tracing::info!(user_id = %user.id, "login_succeeded");
    Ok(Redirect::to(&target))
}

#[utoipa::path(get, path = "/logout", tag = "Users", responses((status = 303, description = "Logged out")))]
pub async fn logout(rc: RequestContext) -> Redirect {
    if let Some(user) = &rc.user {
        tracing::info!(user_id = %user.id, "logout");
    }
    rc.session.logout();
    rc.session.flash_success("You are logged out!");
    Redirect::to("/listings")
}
