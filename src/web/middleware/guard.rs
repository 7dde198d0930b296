//! Route guards.
//!
//! Each guard runs its requirements in order before the handler: sign-in
//! first, then the role.
//! A denial never reaches the handler: it becomes a flash notice and a
//! redirect. On success `CurrentUser` is injected for downstream handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::access::{check_all, AccessDecision, Requirement};
use crate::error::AppError;
use crate::models::enums::Role;
use crate::session::SessionContext;
use crate::web::error::WebError;
use crate::web::types::{CurrentUser, WebContext};

const SIGNED_IN: &[Requirement] = &[Requirement::Authenticated];
const ADMIN: &[Requirement] = &[Requirement::Authenticated, Requirement::Role(Role::Admin)];
const DOCTOR: &[Requirement] = &[Requirement::Authenticated, Requirement::Role(Role::Doctor)];

/// Any signed-in user.
pub async fn require_login(req: Request<axum::body::Body>, next: Next) -> Response {
    guard(req, next, SIGNED_IN).await
}

pub async fn require_admin(req: Request<axum::body::Body>, next: Next) -> Response {
    guard(req, next, ADMIN).await
}

pub async fn require_doctor(req: Request<axum::body::Body>, next: Next) -> Response {
    guard(req, next, DOCTOR).await
}

async fn guard(
    mut req: Request<axum::body::Body>,
    next: Next,
    requirements: &'static [Requirement],
) -> Response {
    let Some(ctx) = req.extensions().get::<WebContext>().cloned() else {
        tracing::error!("Guard mounted without a web context");
        return WebError::new(AppError::NotFound("Page"), "/").into_response();
    };
    let user_id = req
        .extensions()
        .get::<SessionContext>()
        .and_then(SessionContext::get_user_id);

    match check_all(user_id, ctx.core.relational(), requirements) {
        AccessDecision::Allow { user_id } => {
            req.extensions_mut().insert(CurrentUser { user_id });
            next.run(req).await
        }
        AccessDecision::Deny(denial) => {
            tracing::info!(
                path = %req.uri().path(),
                user_id = ?user_id,
                ?denial,
                "Access denied"
            );
            WebError::new(AppError::Authorization(denial), denial.redirect_to()).into_response()
        }
    }
}
