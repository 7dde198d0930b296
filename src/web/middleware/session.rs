//! Session middleware.
//!
//! Resolves the session cookie into a `SessionContext` for downstream
//! layers, then writes the context back and issues a new cookie when the
//! token changed.

use axum::http::{header, HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;

use crate::session::{FlashBag, SESSION_COOKIE};
use crate::web::types::WebContext;

pub async fn load_session(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let Some(ctx) = req.extensions().get::<WebContext>().cloned() else {
        tracing::error!("Session middleware mounted without a web context");
        return next.run(req).await;
    };

    let token = session_token(req.headers());
    let session = ctx.sessions.load(token.as_deref());
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    if let Some(FlashBag(flashes)) = response.extensions_mut().remove::<FlashBag>() {
        session.extend_flashes(flashes);
    }

    if let Some(token) = ctx.sessions.save(&session) {
        let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Session cookie not encodable"),
        }
    }

    response
}

/// Extract our token from the `Cookie` header(s).
fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; strokecare_session=abc123; lang=en"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_cookie_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("strokecare_session_old=x"));
        assert_eq!(session_token(&headers), None);
    }
}
