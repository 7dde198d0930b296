//! Patient list, record view, registration (admin), correction (doctor)
//! and deletion (admin).

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum::{Extension, Form};

use super::{form_or_default, page};
use crate::patients;
use crate::session::{FlashLevel, SessionContext};
use crate::validation::PatientForm;
use crate::web::error::{OrBack, WebError};
use crate::web::types::{parse_patient_id, CurrentUser, WebContext};
use crate::web::views;

/// `GET /patients`
pub async fn list(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Html<String>, WebError> {
    let patients = patients::list(ctx.core.relational()).or_back("/")?;
    Ok(views::patient_list(&page(&ctx, &session), &patients, ctx.core.today()))
}

/// `GET /patients/:id`
pub async fn show(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let patient_id = parse_patient_id(&id).or_back("/patients")?;
    let record = patients::record(
        ctx.core.relational(),
        ctx.core.documents(),
        patient_id,
        ctx.core.today(),
    )
    .or_back("/patients")?;
    Ok(views::patient_detail(&page(&ctx, &session), &record))
}

/// `GET /admin/patients`
pub async fn new_form(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
) -> Html<String> {
    views::patient_form(&page(&ctx, &session), None)
}

/// `POST /admin/patients`
pub async fn create(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    Extension(user): Extension<CurrentUser>,
    form: Result<Form<PatientForm>, FormRejection>,
) -> Result<Redirect, WebError> {
    let form = form_or_default(form);
    let patient_id = patients::create(ctx.core.relational(), &form, user.user_id, ctx.core.today())
        .or_back("/admin/patients")?;
    session.flash(FlashLevel::Success, "Patient registered successfully");
    Ok(Redirect::to(&format!("/patients/{patient_id}")))
}

/// `GET /patients/:id/edit`
pub async fn edit_form(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let patient_id = parse_patient_id(&id).or_back("/patients")?;
    let patient = patients::get(ctx.core.relational(), patient_id).or_back("/patients")?;
    Ok(views::patient_form(&page(&ctx, &session), Some(&patient)))
}

/// `POST /patients/:id/edit`
pub async fn update(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    form: Result<Form<PatientForm>, FormRejection>,
) -> Result<Redirect, WebError> {
    let patient_id = parse_patient_id(&id).or_back("/patients")?;
    let form = form_or_default(form);
    patients::update(ctx.core.relational(), patient_id, &form, ctx.core.today())
        .or_back(format!("/patients/{patient_id}/edit"))?;
    session.flash(FlashLevel::Success, "Patient updated successfully");
    Ok(Redirect::to(&format!("/patients/{patient_id}")))
}

/// `POST /patients/:id/delete`
pub async fn delete(
    State(ctx): State<WebContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Redirect, WebError> {
    let patient_id = parse_patient_id(&id).or_back("/patients")?;
    patients::delete(ctx.core.relational(), patient_id).or_back("/patients")?;
    session.flash(FlashLevel::Success, "Patient deleted");
    Ok(Redirect::to("/patients"))
}
