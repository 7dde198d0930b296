//! Stroke-risk assessment entry (doctor only).

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum::{Extension, Form};

use super::{form_or_default, page};
use crate::session::{FlashLevel, SessionContext};
use crate::validation::AssessmentForm;
use crate::web::error::{OrBack, WebError};
use crate::web::types::{parse_patient_id, WebContext};
use crate::web::views;
use crate::{assessments, patients};

/// `GET /patients/:id/assessments`
pub async fn new_form(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let patient_id = parse_patient_id(&id).or_back("/patients")?;
    let patient = patients::get(ctx.core.relational(), patient_id).or_back("/patients")?;
    Ok(views::assessment_form(&page(&ctx, &session), &patient))
}

/// `POST /patients/:id/assessments`
pub async fn create(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    form: Result<Form<AssessmentForm>, FormRejection>,
) -> Result<Redirect, WebError> {
    let patient_id = parse_patient_id(&id).or_back("/patients")?;
    let form = form_or_default(form);
    assessments::record(ctx.core.relational(), ctx.core.documents(), patient_id, &form)
        .or_back(format!("/patients/{patient_id}/assessments"))?;
    session.flash(FlashLevel::Success, "Assessment recorded successfully");
    Ok(Redirect::to(&format!("/patients/{patient_id}")))
}
