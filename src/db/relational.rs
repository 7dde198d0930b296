use std::path::PathBuf;

use rusqlite::Connection;

use super::{repository, sqlite, DatabaseError, RelationalStore};
use crate::models::*;

/// SQLite-backed relational store.
///
/// Holds only the file path: every operation opens its own connection and
/// drops it before returning.
#[derive(Debug, Clone)]
pub struct SqliteRelationalStore {
    path: PathBuf,
}

impl SqliteRelationalStore {
    /// Create the store, running migrations once so later opens are cheap.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let store = Self { path: path.into() };
        store.connect()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, DatabaseError> {
        sqlite::open_database(&self.path)
    }
}

impl RelationalStore for SqliteRelationalStore {
    fn email_exists(&self, email: &str) -> Result<bool, DatabaseError> {
        repository::email_exists(&self.connect()?, email)
    }

    fn create_user(&self, user: &NewUser) -> Result<i64, DatabaseError> {
        repository::insert_user(&self.connect()?, user)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        repository::get_user_by_email(&self.connect()?, email)
    }

    fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        repository::get_user_by_id(&self.connect()?, id)
    }

    fn create_patient(&self, patient: &NewPatient) -> Result<i64, DatabaseError> {
        repository::insert_patient(&self.connect()?, patient)
    }

    fn get_all_patients(&self) -> Result<Vec<Patient>, DatabaseError> {
        repository::get_all_patients(&self.connect()?)
    }

    fn get_patient_by_id(&self, id: i64) -> Result<Option<Patient>, DatabaseError> {
        repository::get_patient_by_id(&self.connect()?, id)
    }

    fn update_patient(&self, id: i64, update: &PatientUpdate) -> Result<bool, DatabaseError> {
        repository::update_patient(&self.connect()?, id, update)
    }

    fn delete_patient(&self, id: i64) -> Result<bool, DatabaseError> {
        repository::delete_patient(&self.connect()?, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash_password;
    use crate::models::enums::Role;

    fn store() -> (SqliteRelationalStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteRelationalStore::open(dir.path().join("records.db")).unwrap();
        (store, dir)
    }

    fn new_user(email: &str, password: &str) -> NewUser {
        NewUser {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: email.into(),
            role: Role::Admin,
            password_hash: hash_password(password, 1_000),
        }
    }

    #[test]
    fn data_persists_across_connections() {
        let (store, _dir) = store();
        let id = store.create_user(&new_user("grace@example.com", "Secret123!")).unwrap();
        assert!(store.email_exists("grace@example.com").unwrap());
        assert_eq!(store.get_user_by_id(id).unwrap().unwrap().role, Role::Admin);
    }

    #[test]
    fn authenticate_verifies_hash() {
        let (store, _dir) = store();
        let id = store.create_user(&new_user("grace@example.com", "Secret123!")).unwrap();

        let user = store.authenticate("grace@example.com", "Secret123!", 1_000).unwrap();
        assert_eq!(user.map(|u| u.id), Some(id));
        assert!(store.authenticate("grace@example.com", "secret123!", 1_000).unwrap().is_none());
        assert!(store.authenticate("nobody@example.com", "Secret123!", 1_000).unwrap().is_none());
    }

    #[test]
    fn unknown_email_costs_as_much_as_wrong_password() {
        const ROUNDS: u32 = 20_000;
        let (store, _dir) = store();
        let mut user = new_user("grace@example.com", "Secret123!");
        user.password_hash = hash_password("Secret123!", ROUNDS);
        store.create_user(&user).unwrap();

        let time = |email: &str| {
            let started = std::time::Instant::now();
            assert!(store.authenticate(email, "Wrong123!", ROUNDS).unwrap().is_none());
            started.elapsed()
        };
        let wrong_password = time("grace@example.com");
        let unknown_email = time("nobody@example.com");

        assert!(
            unknown_email * 4 >= wrong_password,
            "unknown email {unknown_email:?} vs wrong password {wrong_password:?}"
        );
    }
}
