//! Allergy documents filed under a patient.
//!
//! Every mutation names both the allergy and its patient; a mismatch
//! touches nothing and reports the allergy as missing.

use crate::db::{DocumentStore, RelationalStore};
use crate::error::AppError;
use crate::models::{Allergy, NewAllergy};
use crate::validation::{validate_allergy, AllergyForm};

/// Record a new allergy for an existing patient. Returns the document id.
pub fn add(
    relational: &dyn RelationalStore,
    documents: &dyn DocumentStore,
    patient_id: i64,
    form: &AllergyForm,
) -> Result<String, AppError> {
    let valid = validate_allergy(form)?;

    if relational.get_patient_by_id(patient_id)?.is_none() {
        return Err(AppError::NotFound("Patient"));
    }

    let allergy_id = documents.create_allergy(&NewAllergy {
        patient_id,
        allergen: valid.allergen,
        severity: valid.severity,
        date_added: valid.date_added,
    })?;

    tracing::info!(patient_id, %allergy_id, "Allergy recorded");
    Ok(allergy_id)
}

/// Fetch an allergy only if it belongs to `patient_id`.
pub fn get(
    documents: &dyn DocumentStore,
    patient_id: i64,
    allergy_id: &str,
) -> Result<Allergy, AppError> {
    documents
        .get_allergy(allergy_id)?
        .filter(|allergy| allergy.patient_id == patient_id)
        .ok_or(AppError::NotFound("Allergy"))
}

pub fn update(
    documents: &dyn DocumentStore,
    patient_id: i64,
    allergy_id: &str,
    form: &AllergyForm,
) -> Result<(), AppError> {
    let changes = validate_allergy(form)?;

    if !documents.update_allergy(allergy_id, patient_id, &changes)? {
        tracing::info!(patient_id, %allergy_id, "Allergy update matched no document");
        return Err(AppError::NotFound("Allergy"));
    }

    tracing::info!(patient_id, %allergy_id, "Allergy updated");
    Ok(())
}

pub fn remove(documents: &dyn DocumentStore, patient_id: i64, allergy_id: &str) -> Result<(), AppError> {
    if !documents.delete_allergy(allergy_id, patient_id)? {
        return Err(AppError::NotFound("Allergy"));
    }
    tracing::info!(patient_id, %allergy_id, "Allergy deleted");
    Ok(())
}
