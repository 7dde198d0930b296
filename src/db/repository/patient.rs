use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::enums::Gender;
use crate::models::*;

const PATIENT_COLUMNS: &str =
    "id, first_name, last_name, email, gender, date_of_birth, created_by";

pub fn insert_patient(conn: &Connection, patient: &NewPatient) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (first_name, last_name, email, gender, date_of_birth, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient.first_name,
            patient.last_name,
            patient.email,
            patient.gender.as_str(),
            patient.date_of_birth.to_string(),
            patient.created_by,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_all_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients ORDER BY last_name, first_name, id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], read_patient_row)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

pub fn get_patient_by_id(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1");
    let row = conn.query_row(&sql, params![id], read_patient_row).optional()?;
    row.map(patient_from_row).transpose()
}

pub fn update_patient(
    conn: &Connection,
    id: i64,
    update: &PatientUpdate,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE patients
         SET first_name = ?1, last_name = ?2, gender = ?3, date_of_birth = ?4
         WHERE id = ?5",
        params![
            update.first_name,
            update.last_name,
            update.gender.as_str(),
            update.date_of_birth.to_string(),
            id,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete_patient(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let deleted = conn.execute("DELETE FROM patients WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

type PatientRow = (i64, String, String, String, String, String, i64);

fn read_patient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    let (id, first_name, last_name, email, gender, date_of_birth, created_by) = row;
    Ok(Patient {
        id,
        first_name,
        last_name,
        email,
        gender: Gender::from_str(&gender)?,
        date_of_birth: NaiveDate::parse_from_str(&date_of_birth, "%Y-%m-%d")
            .map_err(|e| DatabaseError::ConstraintViolation(format!("date_of_birth: {e}")))?,
        created_by,
    })
}
