pub mod error;
pub mod forms;
pub mod health;
pub mod listings;
pub mod method_override;
pub mod openapi;
pub mod reviews;
pub mod session;
pub mod users;
pub mod views;

use axum::extract::{DefaultBodyLimit, MatchedPath};
use axum::handler::HandlerWithoutStateExt;
use axum::response::Redirect;
use axum::{Router, middleware, routing::get};
use ::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::{Config, StorageBackend};
use crate::bootstrap::services::UPLOADS_ROUTE;

use self::method_override::MethodOverride;
use self::openapi::ApiDoc;

// Room for the text fields and multipart framing around a maximal image.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

// Uploaded files share the app's origin, so active content (SVG scripts)
// must never run when one is opened directly.
const UPLOADS_CSP: &str = "sandbox; default-src 'none'; style-src 'unsafe-inline'";

/// The complete application: routes, middleware and method override.
pub fn app(ctx: AppContext) -> MethodOverride<Router> {
    method_override::wrap(router(ctx))
}

pub fn router(ctx: AppContext) -> Router {
    let cfg = ctx.cfg.clone();

    let mut router = Router::new()
        .route("/", get(|| async { Redirect::to("/listings") }))
        .merge(listings::routes(ctx.clone()))
        .merge(reviews::routes(ctx.clone()))
        .merge(users::routes(ctx.clone()))
        .merge(health::routes(ctx.clone()))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()));

    if cfg.storage_backend == StorageBackend::Filesystem {
        let uploads = ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::overriding(
                header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static(UPLOADS_CSP),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .service(ServeDir::new(&cfg.uploads_dir));
        router = router.nest_service(UPLOADS_ROUTE, uploads);
    }

    let router = match &cfg.public_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir)
                .call_fallback_on_method_not_allowed(true)
                .fallback(error::not_found.into_service()),
        ),
        None => router.fallback(error::not_found),
    };

    router
        .layer(middleware::from_fn_with_state(ctx, session::session_layer))
        .layer(cors(&cfg))
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes + FORM_OVERHEAD_BYTES))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &::http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        )
}

/// Cross-origin access is only opened to a configured frontend.
fn cors(cfg: &Config) -> CorsLayer {
    let Some(origin) = cfg.frontend_url.as_deref() else {
        return CorsLayer::new();
    };
    match HeaderValue::from_str(origin) {
        Ok(v) => CorsLayer::new()
            .allow_origin(v)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
            ])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(err) => {
            tracing::warn!(error = ?err, origin, "invalid FRONTEND_URL; CORS disabled");
            CorsLayer::new()
        }
    }
}
