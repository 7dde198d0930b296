//! Boundary errors: every failure becomes a flash notice plus a redirect.

use axum::response::{IntoResponse, Redirect, Response};

use crate::error::AppError;
use crate::session::{Flash, FlashBag, FlashLevel};

/// An operation failure together with the view to return to.
#[derive(Debug)]
pub struct WebError {
    pub error: AppError,
    pub back: String,
}

impl WebError {
    pub fn new(error: impl Into<AppError>, back: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            back: back.into(),
        }
    }

    fn level(&self) -> FlashLevel {
        match &self.error {
            AppError::Authorization(denial) => denial.level(),
            AppError::NotFound(_) => FlashLevel::Warning,
            AppError::Validation(_) | AppError::Persistence(_) | AppError::Task(_) => FlashLevel::Danger,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let flash = Flash::new(self.level(), self.error.user_message());
        let mut response = Redirect::to(&self.back).into_response();
        // Picked up by the session middleware on the way out.
        response.extensions_mut().insert(FlashBag(vec![flash]));
        response
    }
}

/// Attach a return target to an operation result.
pub trait OrBack<T> {
    fn or_back(self, back: impl Into<String>) -> Result<T, WebError>;
}

impl<T, E: Into<AppError>> OrBack<T> for Result<T, E> {
    fn or_back(self, back: impl Into<String>) -> Result<T, WebError> {
        self.map_err(|e| WebError::new(e, back))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Denial;
    use crate::db::DatabaseError;
    use crate::validation::ValidationError;
    use axum::http::{header, StatusCode};

    fn flashes(response: &Response) -> Vec<Flash> {
        response.extensions().get::<FlashBag>().cloned().unwrap_or_default().0
    }

    #[test]
    fn validation_redirects_back_with_reason() {
        let response = WebError::new(ValidationError("Invalid BMI"), "/patients/1/assessments").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/patients/1/assessments");
        assert_eq!(flashes(&response), vec![Flash::new(FlashLevel::Danger, "Invalid BMI")]);
    }

    #[test]
    fn login_denial_is_a_warning() {
        let response = WebError::new(AppError::Authorization(Denial::LoginRequired), "/login").into_response();
        assert_eq!(flashes(&response)[0].level, FlashLevel::Warning);
        assert_eq!(flashes(&response)[0].message, "Please log in to continue");
    }

    #[test]
    fn persistence_detail_never_reaches_the_page() {
        let result: Result<(), DatabaseError> = Err(DatabaseError::ConstraintViolation("secret detail".into()));
        let response = result.or_back("/patients").unwrap_err().into_response();
        let shown = flashes(&response);
        assert_eq!(shown[0].message, crate::error::GENERIC_FAILURE);
    }
}
