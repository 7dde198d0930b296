//! Stroke-risk assessments. Append-only: once recorded they are never edited.

use crate::db::{DocumentStore, RelationalStore};
use crate::error::AppError;
use crate::models::Assessment;
use crate::validation::{validate_assessment, AssessmentForm};

pub fn record(
    relational: &dyn RelationalStore,
    documents: &dyn DocumentStore,
    patient_id: i64,
    form: &AssessmentForm,
) -> Result<String, AppError> {
    let assessment = validate_assessment(patient_id, form)?;

    if relational.get_patient_by_id(patient_id)?.is_none() {
        return Err(AppError::NotFound("Patient"));
    }

    let assessment_id = documents.create_assessment(&assessment)?;
    tracing::info!(patient_id, %assessment_id, stroke = assessment.stroke, "Assessment recorded");
    Ok(assessment_id)
}

pub fn history(documents: &dyn DocumentStore, patient_id: i64) -> Result<Vec<Assessment>, AppError> {
    Ok(documents.get_assessments_by_patient(patient_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_state::CoreState;
    use crate::models::enums::{Gender, Role, WorkType};
    use crate::models::{NewPatient, NewUser};
    use chrono::NaiveDate;

    fn patient(state: &CoreState) -> i64 {
        let admin = state
            .relational()
            .create_user(&NewUser {
                first_name: "Ada".into(),
                last_name: "Admin".into(),
                email: "admin@example.com".into(),
                role: Role::Admin,
                password_hash: "unused".into(),
            })
            .unwrap();
        state
            .relational()
            .create_patient(&NewPatient {
                first_name: "Pat".into(),
                last_name: "Ient".into(),
                email: "pat@example.com".into(),
                gender: Gender::Male,
                date_of_birth: NaiveDate::from_ymd_opt(1955, 9, 9).unwrap(),
                created_by: admin,
            })
            .unwrap()
    }

    fn form() -> AssessmentForm {
        AssessmentForm {
            hypertension: "1".into(),
            ever_married: "Yes".into(),
            work_type: "Self-employed".into(),
            residence_type: "Rural".into(),
            avg_glucose_level: "202.21".into(),
            bmi: "10".into(),
            smoking_status: "Never smoked".into(),
            stroke: "1".into(),
        }
    }

    #[test]
    fn recorded_assessments_accumulate() {
        let (state, _dir) = CoreState::open_temp();
        let pid = patient(&state);
        record(state.relational(), state.documents(), pid, &form()).unwrap();
        record(state.relational(), state.documents(), pid, &form()).unwrap();

        let history = history(state.documents(), pid).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].data.work_type, WorkType::SelfEmployed);
        assert!(history[0].data.hypertension);
        assert_ne!(history[0].id, history[1].id);
    }

    #[test]
    fn invalid_input_stores_nothing() {
        let (state, _dir) = CoreState::open_temp();
        let pid = patient(&state);
        let mut bad = form();
        bad.bmi = "9.5".into();
        let err = record(state.relational(), state.documents(), pid, &bad).unwrap_err();
        assert!(matches!(err, AppError::Validation(e) if e.reason() == "BMI must be between 10 and 100"));
        assert!(history(state.documents(), pid).unwrap().is_empty());
    }

    #[test]
    fn unknown_patient_is_not_found() {
        let (state, _dir) = CoreState::open_temp();
        let err = record(state.relational(), state.documents(), 404, &form()).unwrap_err();
        assert!(matches!(err, AppError::NotFound("Patient")));
    }
}
