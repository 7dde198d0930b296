//! Route handlers, one module per workflow.

pub mod allergies;
pub mod assessments;
pub mod auth;
pub mod health;
pub mod pages;
pub mod patients;

use axum::extract::rejection::FormRejection;
use axum::Form;

use crate::error::AppError;
use crate::session::SessionContext;
use crate::web::types::WebContext;
use crate::web::views::Page;

/// Chrome for a rendered page. Consumes pending flashes.
pub(crate) fn page(ctx: &WebContext, session: &SessionContext) -> Page {
    Page {
        viewer: ctx.viewer(session),
        flashes: session.take_flashes(),
    }
}

/// An unreadable body is treated as an empty form, so it fails validation
/// instead of producing a rejection page.
pub(crate) fn form_or_default<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(form)) => form,
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable form body");
            T::default()
        }
    }
}

/// Run password hashing and store calls on the blocking pool so slow key
/// derivation never holds a runtime worker.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERIC_FAILURE;
    use crate::validation::ValidationError;

    #[tokio::test]
    async fn blocking_work_returns_its_result() {
        assert_eq!(blocking(|| Ok(7)).await.unwrap(), 7);
        let err = blocking::<(), _>(|| Err(ValidationError("Invalid BMI").into()))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid BMI");
    }

    #[tokio::test]
    async fn panicking_work_becomes_a_generic_failure() {
        let err = blocking::<(), _>(|| panic!("derivation blew up")).await.unwrap_err();
        assert!(matches!(err, AppError::Task(_)));
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }
}
