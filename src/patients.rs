//! Patient registration, review, correction and removal.
//!
//! Demographics live in the relational store; the clinical documents that
//! hang off a patient are read from the document store only when a full
//! record is requested.

use chrono::NaiveDate;
use serde::Serialize;

use crate::assessments;
use crate::db::{DocumentStore, RelationalStore};
use crate::error::AppError;
use crate::models::{Allergy, Assessment, NewPatient, Patient, PatientUpdate};
use crate::validation::{validate_patient, PatientForm};

/// A patient together with every clinical document filed under them.
#[derive(Debug, Clone, Serialize)]
pub struct PatientRecord {
    pub patient: Patient,
    pub age: i32,
    pub allergies: Vec<Allergy>,
    pub assessments: Vec<Assessment>,
}

/// Register a patient on behalf of `created_by`. Email is mandatory here.
pub fn create(
    store: &dyn RelationalStore,
    form: &PatientForm,
    created_by: i64,
    today: NaiveDate,
) -> Result<i64, AppError> {
    let form = PatientForm {
        email: Some(form.email.clone().unwrap_or_default()),
        ..form.clone()
    };
    let valid = validate_patient(&form, today)?;

    let patient_id = store.create_patient(&NewPatient {
        first_name: valid.first_name,
        last_name: valid.last_name,
        email: valid.email.unwrap_or_default(),
        gender: valid.gender,
        date_of_birth: valid.date_of_birth,
        created_by,
    })?;

    tracing::info!(patient_id, created_by, "Patient registered");
    Ok(patient_id)
}

pub fn list(store: &dyn RelationalStore) -> Result<Vec<Patient>, AppError> {
    Ok(store.get_all_patients()?)
}

pub fn get(store: &dyn RelationalStore, patient_id: i64) -> Result<Patient, AppError> {
    store
        .get_patient_by_id(patient_id)?
        .ok_or(AppError::NotFound("Patient"))
}

/// Load a patient with allergies and assessments.
pub fn record(
    relational: &dyn RelationalStore,
    documents: &dyn DocumentStore,
    patient_id: i64,
    today: NaiveDate,
) -> Result<PatientRecord, AppError> {
    let patient = get(relational, patient_id)?;
    let allergies = documents.get_allergies_by_patient(patient_id)?;
    let assessments = assessments::history(documents, patient_id)?;
    Ok(PatientRecord {
        age: patient.age_on(today),
        patient,
        allergies,
        assessments,
    })
}

/// Correct name, gender or birth date. Any submitted email is ignored.
pub fn update(
    store: &dyn RelationalStore,
    patient_id: i64,
    form: &PatientForm,
    today: NaiveDate,
) -> Result<(), AppError> {
    let form = PatientForm {
        email: None,
        ..form.clone()
    };
    let valid = validate_patient(&form, today)?;

    let updated = store.update_patient(
        patient_id,
        &PatientUpdate {
            first_name: valid.first_name,
            last_name: valid.last_name,
            gender: valid.gender,
            date_of_birth: valid.date_of_birth,
        },
    )?;
    if !updated {
        return Err(AppError::NotFound("Patient"));
    }

    tracing::info!(patient_id, "Patient updated");
    Ok(())
}

/// Remove the demographic record. Allergy and assessment documents are
/// left in place.
pub fn delete(store: &dyn RelationalStore, patient_id: i64) -> Result<(), AppError> {
    if !store.delete_patient(patient_id)? {
        return Err(AppError::NotFound("Patient"));
    }
    tracing::info!(patient_id, "Patient deleted; clinical documents retained");
    Ok(())
}
