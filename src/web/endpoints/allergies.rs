//! Allergy entry, correction and removal (doctor only).

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum::{Extension, Form};

use super::{form_or_default, page};
use crate::session::{FlashLevel, SessionContext};
use crate::validation::AllergyForm;
use crate::web::error::{OrBack, WebError};
use crate::web::types::{parse_patient_id, WebContext};
use crate::web::views;
use crate::{allergies, patients};

/// `GET /patients/:id/allergies`
pub async fn new_form(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let patient_id = parse_patient_id(&id).or_back("/patients")?;
    let patient = patients::get(ctx.core.relational(), patient_id).or_back("/patients")?;
    Ok(views::allergy_form(&page(&ctx, &session), &patient, None, ctx.core.today()))
}

/// `POST /patients/:id/allergies`
pub async fn create(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    form: Result<Form<AllergyForm>, FormRejection>,
) -> Result<Redirect, WebError> {
    let patient_id = parse_patient_id(&id).or_back("/patients")?;
    let form = form_or_default(form);
    allergies::add(ctx.core.relational(), ctx.core.documents(), patient_id, &form)
        .or_back(format!("/patients/{patient_id}/allergies"))?;
    session.flash(FlashLevel::Success, "Allergy added successfully");
    Ok(Redirect::to(&format!("/patients/{patient_id}")))
}

/// `GET /patients/:id/allergies/:allergy_id/edit`
pub async fn edit_form(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    Path((id, allergy_id)): Path<(String, String)>,
) -> Result<Html<String>, WebError> {
    let patient_id = parse_patient_id(&id).or_back("/patients")?;
    let back = format!("/patients/{patient_id}");
    let patient = patients::get(ctx.core.relational(), patient_id).or_back("/patients")?;
    let allergy = allergies::get(ctx.core.documents(), patient_id, &allergy_id).or_back(back)?;
    Ok(views::allergy_form(
        &page(&ctx, &session),
        &patient,
        Some(&allergy),
        ctx.core.today(),
    ))
}

/// `POST /patients/:id/allergies/:allergy_id/edit`
pub async fn update(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    Path((id, allergy_id)): Path<(String, String)>,
    form: Result<Form<AllergyForm>, FormRejection>,
) -> Result<Redirect, WebError> {
    let patient_id = parse_patient_id(&id).or_back("/patients")?;
    let form = form_or_default(form);
    let back = format!("/patients/{patient_id}");
    allergies::update(ctx.core.documents(), patient_id, &allergy_id, &form).or_back(back.clone())?;
    session.flash(FlashLevel::Success, "Allergy updated successfully");
    Ok(Redirect::to(&back))
}

/// `POST /patients/:id/allergies/:allergy_id/delete`
pub async fn delete(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    Path((id, allergy_id)): Path<(String, String)>,
) -> Result<Redirect, WebError> {
    let patient_id = parse_patient_id(&id).or_back("/patients")?;
    let back = format!("/patients/{patient_id}");
    allergies::remove(ctx.core.documents(), patient_id, &allergy_id).or_back(back.clone())?;
    session.flash(FlashLevel::Success, "Allergy deleted");
    Ok(Redirect::to(&back))
}
