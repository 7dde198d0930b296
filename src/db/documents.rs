//! Document store: JSON documents grouped into named collections.
//!
//! Bodies are free-form JSON; the store only relies on `$.patient_id` for
//! scoping. Ids are ObjectId hex strings, never numeric, so they cannot be
//! confused with relational patient ids.

use std::path::PathBuf;

use bson::oid::ObjectId;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{sqlite, DatabaseError, DocumentStore};
use crate::models::*;

#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    path: PathBuf,
    allergy_collection: String,
    assessment_collection: String,
}

impl SqliteDocumentStore {
    pub fn open(
        path: impl Into<PathBuf>,
        allergy_collection: impl Into<String>,
        assessment_collection: impl Into<String>,
    ) -> Result<Self, DatabaseError> {
        let store = Self {
            path: path.into(),
            allergy_collection: allergy_collection.into(),
            assessment_collection: assessment_collection.into(),
        };
        store.connect()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, DatabaseError> {
        sqlite::open_document_database(&self.path)
    }

    fn insert<T: Serialize>(&self, collection: &str, body: &T) -> Result<String, DatabaseError> {
        let id = ObjectId::new().to_hex();
        let json = serde_json::to_string(body)?;
        self.connect()?.execute(
            "INSERT INTO documents (id, collection, body) VALUES (?1, ?2, ?3)",
            params![id, collection, json],
        )?;
        Ok(id)
    }

    fn find_by_patient<T: DeserializeOwned>(
        &self,
        collection: &str,
        patient_id: i64,
    ) -> Result<Vec<(String, T)>, DatabaseError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, body FROM documents
             WHERE collection = ?1 AND json_extract(body, '$.patient_id') = ?2
             ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![collection, patient_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut docs = Vec::new();
        for row in rows {
            let (id, body) = row?;
            docs.push((id, serde_json::from_str(&body)?));
        }
        Ok(docs)
    }

    fn find_one<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, DatabaseError> {
        let body: Option<String> = self
            .connect()?
            .query_row(
                "SELECT body FROM documents WHERE id = ?1 AND collection = ?2",
                params![id, collection],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|b| serde_json::from_str(&b).map_err(DatabaseError::from))
            .transpose()
    }
}

/// Canonical hex form of a document id, or `None` if it is not an ObjectId.
fn parse_document_id(id: &str) -> Option<String> {
    ObjectId::parse_str(id.trim()).ok().map(|oid| oid.to_hex())
}

impl DocumentStore for SqliteDocumentStore {
    fn create_allergy(&self, allergy: &NewAllergy) -> Result<String, DatabaseError> {
        self.insert(&self.allergy_collection, allergy)
    }

    fn get_allergies_by_patient(&self, patient_id: i64) -> Result<Vec<Allergy>, DatabaseError> {
        let docs = self.find_by_patient::<NewAllergy>(&self.allergy_collection, patient_id)?;
        Ok(docs.into_iter().map(|(id, doc)| doc.with_id(id)).collect())
    }

    fn get_allergy(&self, allergy_id: &str) -> Result<Option<Allergy>, DatabaseError> {
        let Some(id) = parse_document_id(allergy_id) else {
            return Ok(None);
        };
        let doc = self.find_one::<NewAllergy>(&self.allergy_collection, &id)?;
        Ok(doc.map(|d| d.with_id(id)))
    }

    fn update_allergy(
        &self,
        allergy_id: &str,
        patient_id: i64,
        changes: &AllergyChanges,
    ) -> Result<bool, DatabaseError> {
        let Some(id) = parse_document_id(allergy_id) else {
            return Ok(false);
        };
        let matched = self.connect()?.execute(
            "UPDATE documents
             SET body = json_set(body, '$.allergen', ?1, '$.severity', ?2, '$.date_added', ?3)
             WHERE id = ?4 AND collection = ?5 AND json_extract(body, '$.patient_id') = ?6",
            params![
                changes.allergen,
                changes.severity.as_str(),
                changes.date_added.to_string(),
                id,
                self.allergy_collection,
                patient_id,
            ],
        )?;
        Ok(matched > 0)
    }

    fn delete_allergy(&self, allergy_id: &str, patient_id: i64) -> Result<bool, DatabaseError> {
        let Some(id) = parse_document_id(allergy_id) else {
            return Ok(false);
        };
        let deleted = self.connect()?.execute(
            "DELETE FROM documents
             WHERE id = ?1 AND collection = ?2 AND json_extract(body, '$.patient_id') = ?3",
            params![id, self.allergy_collection, patient_id],
        )?;
        Ok(deleted > 0)
    }

    fn create_assessment(&self, assessment: &NewAssessment) -> Result<String, DatabaseError> {
        self.insert(&self.assessment_collection, assessment)
    }

    fn get_assessments_by_patient(&self, patient_id: i64) -> Result<Vec<Assessment>, DatabaseError> {
        let docs = self.find_by_patient::<NewAssessment>(&self.assessment_collection, patient_id)?;
        Ok(docs
            .into_iter()
            .map(|(id, data)| Assessment { id, data })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::*;
    use chrono::NaiveDate;

    fn store() -> (SqliteDocumentStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store =
            SqliteDocumentStore::open(dir.path().join("docs.db"), "allergies", "assessments")
                .unwrap();
        (store, dir)
    }

    fn peanut(patient_id: i64) -> NewAllergy {
        NewAllergy {
            patient_id,
            allergen: "Peanuts".into(),
            severity: AllergySeverity::Severe,
            date_added: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        }
    }

    fn assessment(patient_id: i64) -> NewAssessment {
        NewAssessment {
            patient_id,
            hypertension: false,
            ever_married: EverMarried::No,
            work_type: WorkType::Private,
            residence_type: ResidenceType::Rural,
            avg_glucose_level: 90.0,
            bmi: 22.5,
            smoking_status: SmokingStatus::Unknown,
            stroke: false,
        }
    }

    #[test]
    fn allergy_ids_are_object_ids() {
        let (store, _dir) = store();
        let id = store.create_allergy(&peanut(1)).unwrap();
        assert_eq!(id.len(), 24);
        assert!(ObjectId::parse_str(&id).is_ok());
    }

    #[test]
    fn allergies_scoped_by_patient() {
        let (store, _dir) = store();
        let a = store.create_allergy(&peanut(1)).unwrap();
        store.create_allergy(&peanut(2)).unwrap();

        let for_one = store.get_allergies_by_patient(1).unwrap();
        assert_eq!(for_one.len(), 1);
        assert_eq!(for_one[0].id, a);
        assert_eq!(for_one[0].severity, AllergySeverity::Severe);
        assert!(store.get_allergies_by_patient(3).unwrap().is_empty());
    }

    #[test]
    fn collections_are_isolated() {
        let (store, _dir) = store();
        store.create_allergy(&peanut(1)).unwrap();
        store.create_assessment(&assessment(1)).unwrap();

        assert_eq!(store.get_allergies_by_patient(1).unwrap().len(), 1);
        assert_eq!(store.get_assessments_by_patient(1).unwrap().len(), 1);
    }

    #[test]
    fn update_requires_matching_patient() {
        let (store, _dir) = store();
        let id = store.create_allergy(&peanut(1)).unwrap();
        let changes = AllergyChanges {
            allergen: "Shellfish".into(),
            severity: AllergySeverity::Mild,
            date_added: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };

        assert!(!store.update_allergy(&id, 2, &changes).unwrap());
        let untouched = store.get_allergy(&id).unwrap().unwrap();
        assert_eq!(untouched.allergen, "Peanuts");
        assert_eq!(untouched.patient_id, 1);

        assert!(store.update_allergy(&id, 1, &changes).unwrap());
        let updated = store.get_allergy(&id).unwrap().unwrap();
        assert_eq!(updated.allergen, "Shellfish");
        assert_eq!(updated.severity, AllergySeverity::Mild);
        assert_eq!(updated.patient_id, 1);
    }

    #[test]
    fn malformed_ids_match_nothing() {
        let (store, _dir) = store();
        store.create_allergy(&peanut(1)).unwrap();
        let changes = AllergyChanges {
            allergen: "Dust".into(),
            severity: AllergySeverity::Mild,
            date_added: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert!(store.get_allergy("42").unwrap().is_none());
        assert!(!store.update_allergy("not-an-id", 1, &changes).unwrap());
        assert!(!store.delete_allergy("", 1).unwrap());
    }

    #[test]
    fn delete_is_scoped() {
        let (store, _dir) = store();
        let id = store.create_allergy(&peanut(1)).unwrap();
        assert!(!store.delete_allergy(&id, 2).unwrap());
        assert!(store.delete_allergy(&id, 1).unwrap());
        assert!(store.get_allergy(&id).unwrap().is_none());
    }

    #[test]
    fn assessments_round_trip_through_json() {
        let (store, _dir) = store();
        let mut input = assessment(5);
        input.hypertension = true;
        input.avg_glucose_level = 300.0;
        let id = store.create_assessment(&input).unwrap();

        let stored = store.get_assessments_by_patient(5).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].data, input);
    }
}
