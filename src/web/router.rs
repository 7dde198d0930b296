//! Application router.
//!
//! Routes are grouped by the guard they sit behind (public, login, admin,
//! doctor). Each group gets its guard as a route layer; the shared stack
//! wraps them all.
//!
//! Middleware stack (outermost → innermost):
//! 1. Extension(WebContext) → 2. Cache-Control → 3. Request logger →
//! 4. Session loader → 5. Group guard → Handler

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::core_state::CoreState;
use crate::web::endpoints;
use crate::web::middleware::{guard, session, trace};
use crate::web::types::WebContext;

/// Build the application router over shared state.
pub fn app_router(core: Arc<CoreState>) -> Router {
    build_router(WebContext::new(core))
}

fn build_router(ctx: WebContext) -> Router {
    // Groups stay `Router<WebContext>` until merged; state is bound once.
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let public = Router::<WebContext>::new()
        .route("/", get(endpoints::pages::home))
        .route("/about", get(endpoints::pages::about))
        .route("/health", get(endpoints::health::check))
        .route(
            "/register",
            get(endpoints::auth::register_form).post(endpoints::auth::register),
        )
        .route(
            "/login",
            get(endpoints::auth::login_form).post(endpoints::auth::login),
        )
        .route("/logout", post(endpoints::auth::logout));

    let signed_in = Router::new()
        .route("/patients", get(endpoints::patients::list))
        .route("/patients/:id", get(endpoints::patients::show))
        .route_layer(from_fn(guard::require_login));

    let admin = Router::new()
        .route(
            "/admin/patients",
            get(endpoints::patients::new_form).post(endpoints::patients::create),
        )
        .route("/patients/:id/delete", post(endpoints::patients::delete))
        .route_layer(from_fn(guard::require_admin));

    let doctor = Router::new()
        .route(
            "/patients/:id/edit",
            get(endpoints::patients::edit_form).post(endpoints::patients::update),
        )
        .route(
            "/patients/:id/allergies",
            get(endpoints::allergies::new_form).post(endpoints::allergies::create),
        )
        .route(
            "/patients/:id/allergies/:allergy_id/edit",
            get(endpoints::allergies::edit_form).post(endpoints::allergies::update),
        )
        .route(
            "/patients/:id/allergies/:allergy_id/delete",
            post(endpoints::allergies::delete),
        )
        .route(
            "/patients/:id/assessments",
            get(endpoints::assessments::new_form).post(endpoints::assessments::create),
        )
        .route_layer(from_fn(guard::require_doctor));

    Router::new()
        .merge(public)
        .merge(signed_in)
        .merge(admin)
        .merge(doctor)
        .fallback(endpoints::pages::not_found)
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(from_fn(session::load_session))
        .layer(from_fn(trace::log_request))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Extension must be outermost so middleware can extract WebContext
        .layer(axum::Extension(ctx))
}
