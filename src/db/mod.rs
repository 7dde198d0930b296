//! Persistence capabilities.
//!
//! Two independent stores with no shared transaction:
//! - [`RelationalStore`]: users and patients (SQLite tables)
//! - [`DocumentStore`]: allergy and assessment documents (JSON collections)
//!
//! Callers sequence the two explicitly; a failure after a write to one store
//! is reported but never compensated in the other.

pub mod documents;
pub mod relational;
pub mod repository;
pub mod sqlite;

pub use documents::SqliteDocumentStore;
pub use relational::SqliteRelationalStore;
pub use sqlite::*;

use thiserror::Error;

use crate::crypto;
use crate::models::*;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Malformed document: {0}")]
    Document(#[from] serde_json::Error),
}

/// Credential and patient storage.
pub trait RelationalStore: Send + Sync {
    fn email_exists(&self, email: &str) -> Result<bool, DatabaseError>;

    fn create_user(&self, user: &NewUser) -> Result<i64, DatabaseError>;

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    /// Verify credentials against the stored salted hash.
    ///
    /// Unknown email and wrong password are indistinguishable: both yield
    /// `None`, and an unknown email still pays for a derivation at
    /// `iterations` rounds.
    fn authenticate(
        &self,
        email: &str,
        password: &str,
        iterations: u32,
    ) -> Result<Option<User>, DatabaseError> {
        let Some(user) = self.get_user_by_email(email)? else {
            crypto::verify_without_hash(password, iterations);
            return Ok(None);
        };
        if crypto::verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    fn create_patient(&self, patient: &NewPatient) -> Result<i64, DatabaseError>;

    fn get_all_patients(&self) -> Result<Vec<Patient>, DatabaseError>;

    fn get_patient_by_id(&self, id: i64) -> Result<Option<Patient>, DatabaseError>;

    /// Returns `false` when no patient has this id.
    fn update_patient(&self, id: i64, update: &PatientUpdate) -> Result<bool, DatabaseError>;

    /// Returns `false` when no patient has this id. Documents are not touched.
    fn delete_patient(&self, id: i64) -> Result<bool, DatabaseError>;
}

/// Allergy and assessment documents, always scoped by patient id.
pub trait DocumentStore: Send + Sync {
    fn create_allergy(&self, allergy: &NewAllergy) -> Result<String, DatabaseError>;

    fn get_allergies_by_patient(&self, patient_id: i64) -> Result<Vec<Allergy>, DatabaseError>;

    fn get_allergy(&self, allergy_id: &str) -> Result<Option<Allergy>, DatabaseError>;

    /// Applies `changes` only when both ids match one document.
    /// Returns `false` (and changes nothing) otherwise.
    fn update_allergy(
        &self,
        allergy_id: &str,
        patient_id: i64,
        changes: &AllergyChanges,
    ) -> Result<bool, DatabaseError>;

    fn delete_allergy(&self, allergy_id: &str, patient_id: i64) -> Result<bool, DatabaseError>;

    fn create_assessment(&self, assessment: &NewAssessment) -> Result<String, DatabaseError>;

    fn get_assessments_by_patient(&self, patient_id: i64) -> Result<Vec<Assessment>, DatabaseError>;
}
