//! Registration, sign-in and sign-out.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::{Html, Redirect};
use axum::{Extension, Form};

use super::{blocking, form_or_default, page};
use crate::accounts;
use crate::session::{FlashLevel, SessionContext};
use crate::validation::{LoginForm, RegistrationForm};
use crate::web::error::{OrBack, WebError};
use crate::web::types::WebContext;
use crate::web::views;

/// `GET /register`
pub async fn register_form(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
) -> Html<String> {
    views::register(&page(&ctx, &session))
}

/// `POST /register`
pub async fn register(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    form: Result<Form<RegistrationForm>, FormRejection>,
) -> Result<Redirect, WebError> {
    let form = form_or_default(form);
    let core = ctx.core.clone();
    blocking(move || accounts::register(core.relational(), &form, core.config.password_iterations))
        .await
        .or_back("/register")?;
    session.flash(FlashLevel::Success, "Registration successful. Please log in.");
    Ok(Redirect::to("/login"))
}

/// `GET /login`
pub async fn login_form(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
) -> Html<String> {
    views::login(&page(&ctx, &session))
}

/// `POST /login`: binds the session to the user and rotates its token.
pub async fn login(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Redirect, WebError> {
    let form = form_or_default(form);
    let core = ctx.core.clone();
    let user = blocking(move || accounts::login(core.relational(), &form, core.config.password_iterations))
        .await
        .or_back("/login")?;
    session.set_user_id(user.id);
    session.flash(FlashLevel::Success, format!("Welcome, {}", user.first_name));
    Ok(Redirect::to("/patients"))
}

/// `POST /logout`
pub async fn logout(Extension(session): Extension<SessionContext>) -> Redirect {
    if let Some(user_id) = session.get_user_id() {
        tracing::info!(user_id, "User signed out");
    }
    session.clear();
    session.flash(FlashLevel::Info, "You have been logged out");
    Redirect::to("/")
}
