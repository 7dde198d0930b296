//! Shared application state: configuration plus the two store capabilities.
//!
//! Built once at startup and wrapped in `Arc` for the HTTP layer. The
//! stores are trait objects so tests and alternative backends can be
//! swapped in without touching the handlers.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::Config;
use crate::db::{DatabaseError, DocumentStore, RelationalStore, SqliteDocumentStore, SqliteRelationalStore};

pub struct CoreState {
    pub config: Config,
    pub relational: Arc<dyn RelationalStore>,
    pub documents: Arc<dyn DocumentStore>,
}

impl CoreState {
    pub fn new(
        config: Config,
        relational: Arc<dyn RelationalStore>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            config,
            relational,
            documents,
        }
    }

    /// Open the SQLite-backed stores named in `config`, migrating both.
    pub fn open(config: Config) -> Result<Self, DatabaseError> {
        let relational = SqliteRelationalStore::open(config.db_path.clone())?;
        let documents = SqliteDocumentStore::open(
            config.document_db_path.clone(),
            config.allergy_collection.clone(),
            config.assessment_collection.clone(),
        )?;
        tracing::info!(
            relational = %config.db_path.display(),
            documents = %config.document_db_path.display(),
            "Stores ready"
        );
        Ok(Self::new(config, Arc::new(relational), Arc::new(documents)))
    }

    pub fn relational(&self) -> &dyn RelationalStore {
        self.relational.as_ref()
    }

    pub fn documents(&self) -> &dyn DocumentStore {
        self.documents.as_ref()
    }

    /// Calendar date used for age checks.
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

#[cfg(test)]
impl CoreState {
    /// Fresh on-disk stores in a temporary directory, with a cheap hash cost.
    pub(crate) fn open_temp() -> (Self, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let config = Config::from_lookup(|name| match name {
            "DB_PATH" => Some(root.join("records.db").display().to_string()),
            "DOCUMENT_DB_PATH" => Some(root.join("documents.db").display().to_string()),
            "PASSWORD_ITERATIONS" => Some("1000".into()),
            "SEED_CSV" => Some(root.join("seed.csv").display().to_string()),
            _ => None,
        })
        .unwrap();
        (Self::open(config).unwrap(), dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_both_database_files() {
        let (state, dir) = CoreState::open_temp();
        assert!(dir.path().join("records.db").exists());
        assert!(dir.path().join("documents.db").exists());
        assert_eq!(state.config.password_iterations, 1000);
        assert!(state.relational().get_all_patients().unwrap().is_empty());
        assert!(state.documents().get_allergies_by_patient(1).unwrap().is_empty());
    }
}
