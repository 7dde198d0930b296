//! First-run seeding: demo accounts plus patients and assessments from a CSV.
//!
//! Runs once per relational database; a marker file next to it records
//! completion. Seeded rows bypass form validation, but categorical values
//! must still map onto the closed enums or the row is skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::accounts;
use crate::core_state::CoreState;
use crate::db::DatabaseError;
use crate::error::AppError;
use crate::models::enums::*;
use crate::models::{NewAssessment, NewPatient};
use crate::validation::RegistrationForm;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const DOCTOR_EMAIL: &str = "doctor@example.com";

/// Columns a seed CSV must carry for patients to be imported.
pub const REQUIRED_COLUMNS: [&str; 5] = ["first_name", "last_name", "email", "gender", "age"];

/// Birth date used when a row has no usable age.
const FALLBACK_BIRTH_YEAR: i32 = 1970;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Seed file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Seeding store call failed: {0}")]
    Database(#[from] DatabaseError),
    #[error("Seeding account failed: {0}")]
    Account(#[from] AppError),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub patients_created: usize,
    pub assessments_created: usize,
    pub rows_skipped: usize,
}

/// Seed unless the marker exists. Returns `None` when seeding was skipped.
pub fn run_if_needed(state: &CoreState) -> Result<Option<SeedReport>, SeedError> {
    let marker = state.config.seed_marker_path();
    if marker.exists() {
        tracing::info!(marker = %marker.display(), "Seed marker found, skipping seeding");
        return Ok(None);
    }

    let mut report = SeedReport::default();
    seed_default_users(state, &mut report)?;
    seed_from_csv(state, &state.config.seed_csv, &mut report)?;

    fs::write(&marker, "done\n")?;
    tracing::info!(
        users = report.users_created,
        patients = report.patients_created,
        assessments = report.assessments_created,
        skipped = report.rows_skipped,
        "Seeding complete"
    );
    Ok(Some(report))
}

fn seed_default_users(state: &CoreState, report: &mut SeedReport) -> Result<(), SeedError> {
    // Demo credentials only.
    let defaults = [
        ("Admin", ADMIN_EMAIL, "Admin123!", Role::Admin),
        ("Doctor", DOCTOR_EMAIL, "Doctor123!", Role::Doctor),
    ];
    for (first_name, email, password, role) in defaults {
        if state.relational().email_exists(email)? {
            continue;
        }
        let form = RegistrationForm {
            first_name: first_name.into(),
            last_name: "User".into(),
            email: email.into(),
            password: password.into(),
            confirm_password: password.into(),
            role: role.as_str().into(),
        };
        accounts::register(state.relational(), &form, state.config.password_iterations)?;
        report.users_created += 1;
        tracing::info!(%role, "Created default account");
    }
    Ok(())
}

/// A parsed CSV with lookups by header name.
struct SeedTable {
    columns: HashMap<String, usize>,
    width: usize,
    rows: Vec<Vec<String>>,
}

impl SeedTable {
    fn parse(text: &str) -> Self {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());
        let header = lines.next().map(split_row).unwrap_or_default();
        let width = header.len();
        let columns: HashMap<String, usize> = header
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();
        let rows: Vec<Vec<String>> = lines.map(split_row).collect();
        Self { columns, width, rows }
    }

    fn has(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    fn field<'a>(&self, row: &'a [String], column: &str) -> &'a str {
        self.columns
            .get(column)
            .and_then(|&i| row.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn split_row(line: &str) -> Vec<String> {
    line.split(',')
        .map(|cell| cell.trim().trim_matches('"').trim().to_string())
        .collect()
}

fn parse_int(value: &str) -> i64 {
    value.trim().parse::<f64>().map(|v| v as i64).unwrap_or(0)
}

fn parse_float(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Approximate birth date: 1 January of `today.year() - age`.
fn approximate_birth_date(age: &str, today: NaiveDate) -> NaiveDate {
    let year = age
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|age| today.year() - age as i32)
        .unwrap_or(FALLBACK_BIRTH_YEAR);
    NaiveDate::from_ymd_opt(year, 1, 1)
        .or_else(|| NaiveDate::from_ymd_opt(FALLBACK_BIRTH_YEAR, 1, 1))
        .unwrap_or_default()
}

fn seed_from_csv(state: &CoreState, path: &Path, report: &mut SeedReport) -> Result<(), SeedError> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "Seed CSV not found, skipping patient seeding");
        return Ok(());
    }

    let Some(admin) = state.relational().get_user_by_email(ADMIN_EMAIL)? else {
        tracing::warn!("Default admin missing, cannot seed patients");
        return Ok(());
    };

    let table = SeedTable::parse(&fs::read_to_string(path)?);
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !table.has(column))
        .collect();
    if !missing.is_empty() {
        tracing::warn!(?missing, "Seed CSV lacks required columns, skipping");
        return Ok(());
    }

    let residence_column = if table.has("Residence_type") {
        "Residence_type"
    } else {
        "residence_type"
    };
    let today = state.today();

    for (line, row) in table.rows.iter().enumerate() {
        // Quoted commas are not supported; a misaligned row would shift columns.
        if row.len() != table.width {
            tracing::warn!(
                line,
                cells = row.len(),
                expected = table.width,
                "Seed row has the wrong cell count, skipping"
            );
            report.rows_skipped += 1;
            continue;
        }
        let Some(gender) = Gender::from_str_loose(table.field(row, "gender")) else {
            tracing::warn!(line, "Seed row has an unknown gender, skipping");
            report.rows_skipped += 1;
            continue;
        };

        let patient_id = match state.relational().create_patient(&NewPatient {
            first_name: table.field(row, "first_name").to_string(),
            last_name: table.field(row, "last_name").to_string(),
            email: table.field(row, "email").to_string(),
            gender,
            date_of_birth: approximate_birth_date(table.field(row, "age"), today),
            created_by: admin.id,
        }) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(line, error = %e, "Failed to seed patient");
                report.rows_skipped += 1;
                continue;
            }
        };
        report.patients_created += 1;

        let categorical = (
            EverMarried::from_str_loose(table.field(row, "ever_married")),
            WorkType::from_str_loose(table.field(row, "work_type")),
            ResidenceType::from_str_loose(table.field(row, residence_column)),
            SmokingStatus::from_str_loose(table.field(row, "smoking_status")),
        );
        let (Some(ever_married), Some(work_type), Some(residence_type), Some(smoking_status)) =
            categorical
        else {
            tracing::warn!(line, patient_id, "Seed row has unmapped assessment values, skipping assessment");
            continue;
        };

        let assessment = NewAssessment {
            patient_id,
            hypertension: parse_int(table.field(row, "hypertension")) != 0,
            ever_married,
            work_type,
            residence_type,
            avg_glucose_level: parse_float(table.field(row, "avg_glucose_level")),
            bmi: parse_float(table.field(row, "bmi")),
            smoking_status,
            stroke: parse_int(table.field(row, "stroke")) != 0,
        };
        match state.documents().create_assessment(&assessment) {
            Ok(_) => report.assessments_created += 1,
            Err(e) => tracing::warn!(line, patient_id, error = %e, "Failed to seed assessment"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
first_name,last_name,email,gender,age,hypertension,heart_disease,ever_married,work_type,Residence_type,avg_glucose_level,bmi,smoking_status,stroke
Alice,Smith,alice@example.com,Female,67,0,1,Yes,Private,Urban,228.69,36.6,formerly smoked,1
Bob,Jones,bob@example.com,Male,80.0,1,0,Yes,Private,Rural,105.92,,never smoked,1
Kid,Young,kid@example.com,Female,2,0,0,No,children,Urban,95.1,17.2,Unknown,0
Una,Mapped,una@example.com,Female,40,0,0,Maybe,Private,Urban,90,25,Smokes,0
Xan,Other,xan@example.com,Robot,33,0,0,No,Private,Urban,90,25,Smokes,0
";

    fn write_csv(state: &CoreState, text: &str) {
        fs::write(&state.config.seed_csv, text).unwrap();
    }

    #[test]
    fn seeds_once() {
        let (state, _dir) = CoreState::open_temp();
        write_csv(&state, CSV);

        let report = run_if_needed(&state).unwrap().unwrap();
        assert_eq!(
            report,
            SeedReport {
                users_created: 2,
                patients_created: 4,
                assessments_created: 3,
                rows_skipped: 1,
            }
        );
        assert!(state.config.seed_marker_path().exists());

        assert!(run_if_needed(&state).unwrap().is_none());
        assert_eq!(state.relational().get_all_patients().unwrap().len(), 4);
    }

    #[test]
    fn default_accounts_can_sign_in() {
        let (state, _dir) = CoreState::open_temp();
        run_if_needed(&state).unwrap();

        let admin = state.relational().authenticate(ADMIN_EMAIL, "Admin123!", 1_000).unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        let doctor = state.relational().authenticate(DOCTOR_EMAIL, "Doctor123!", 1_000).unwrap().unwrap();
        assert_eq!(doctor.role, Role::Doctor);
    }

    #[test]
    fn rows_map_leniently() {
        let (state, _dir) = CoreState::open_temp();
        write_csv(&state, CSV);
        run_if_needed(&state).unwrap();
        let year = state.today().year();

        let patients = state.relational().get_all_patients().unwrap();
        let bob = patients.iter().find(|p| p.first_name == "Bob").unwrap();
        assert_eq!(bob.date_of_birth, NaiveDate::from_ymd_opt(year - 80, 1, 1).unwrap());
        let admin = state.relational().get_user_by_email(ADMIN_EMAIL).unwrap().unwrap();
        assert_eq!(bob.created_by, admin.id);

        let bob_assessment = &state.documents().get_assessments_by_patient(bob.id).unwrap()[0];
        assert_eq!(bob_assessment.data.bmi, 0.0);
        assert!(bob_assessment.data.hypertension);
        assert_eq!(bob_assessment.data.smoking_status, SmokingStatus::NeverSmoked);

        let kid = patients.iter().find(|p| p.first_name == "Kid").unwrap();
        let kid_assessment = &state.documents().get_assessments_by_patient(kid.id).unwrap()[0];
        assert_eq!(kid_assessment.data.work_type, WorkType::Children);

        let una = patients.iter().find(|p| p.first_name == "Una").unwrap();
        assert!(state.documents().get_assessments_by_patient(una.id).unwrap().is_empty());
    }

    #[test]
    fn misaligned_rows_are_skipped() {
        let (state, _dir) = CoreState::open_temp();
        write_csv(
            &state,
            "\
first_name,last_name,email,gender,age,hypertension,heart_disease,ever_married,work_type,Residence_type,avg_glucose_level,bmi,smoking_status,stroke
\"Smith, Jr.\",Adam,adam@example.com,Male,50,0,0,Yes,Private,Urban,90,25,Smokes,0
Eve,Short,eve@example.com,Female,45
Ann,Lee,ann@example.com,Female,45,0,0,Yes,Private,Urban,90,25,Smokes,0
",
        );

        let report = run_if_needed(&state).unwrap().unwrap();
        assert_eq!(report.patients_created, 1);
        assert_eq!(report.assessments_created, 1);
        assert_eq!(report.rows_skipped, 2);
        let patients = state.relational().get_all_patients().unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].first_name, "Ann");
    }

    #[test]
    fn missing_columns_skip_patients_but_still_mark() {
        let (state, _dir) = CoreState::open_temp();
        write_csv(&state, "first_name,last_name\nA,B\n");
        let report = run_if_needed(&state).unwrap().unwrap();
        assert_eq!(report.patients_created, 0);
        assert_eq!(report.users_created, 2);
        assert!(state.config.seed_marker_path().exists());
    }

    #[test]
    fn existing_accounts_are_kept() {
        let (state, _dir) = CoreState::open_temp();
        seed_default_users(&state, &mut SeedReport::default()).unwrap();
        let mut report = SeedReport::default();
        seed_default_users(&state, &mut report).unwrap();
        assert_eq!(report.users_created, 0);
    }

    #[test]
    fn birth_date_approximation() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(approximate_birth_date("44", today), NaiveDate::from_ymd_opt(1980, 1, 1).unwrap());
        assert_eq!(approximate_birth_date("1.32", today), NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(approximate_birth_date("", today), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert_eq!(approximate_birth_date("old", today), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
    }
}
