//! Static pages and the fallback.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Extension;

use super::page;
use crate::session::SessionContext;
use crate::web::types::WebContext;
use crate::web::views;

/// `GET /`
pub async fn home(State(ctx): State<WebContext>, Extension(session): Extension<SessionContext>) -> Html<String> {
    views::home(&page(&ctx, &session))
}

/// `GET /about`
pub async fn about(State(ctx): State<WebContext>, Extension(session): Extension<SessionContext>) -> Html<String> {
    views::about(&page(&ctx, &session))
}

pub async fn not_found(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, views::not_found(&page(&ctx, &session)))
}
