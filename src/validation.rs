//! Field validation for every inbound write.
//!
//! Each validator checks its fields in a fixed order and stops at the first
//! violation, so callers always surface exactly one reason. A successful
//! check returns the parsed, typed value that the stores accept.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;

use crate::models::enums::*;
use crate::models::{age_on, AllergyChanges, NewAssessment};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").unwrap());

static PASSWORD_CLASSES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"[a-z]").unwrap(),
        Regex::new(r"[A-Z]").unwrap(),
        Regex::new(r"\d").unwrap(),
        Regex::new(r"\W").unwrap(),
    ]
});

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_AGE_YEARS: i32 = 120;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The single rule a field set violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub &'static str);

impl ValidationError {
    pub fn reason(&self) -> &'static str {
        self.0
    }
}

fn reject<T>(reason: &'static str) -> Result<T, ValidationError> {
    Err(ValidationError(reason))
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// At least eight characters with lowercase, uppercase, digit and symbol.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
        && PASSWORD_CLASSES.iter().all(|class| class.is_match(password))
}

fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .or_else(|_| reject("Invalid date format"))
}

fn parse_finite(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ═══════════════════════════════════════════════════════════
// Registration & login
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
}

/// A registration that passed every field rule. Uniqueness of the email is
/// checked against the credential store afterwards.
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

pub fn validate_registration(form: &RegistrationForm) -> Result<Registration, ValidationError> {
    let required = [
        &form.first_name,
        &form.last_name,
        &form.email,
        &form.password,
        &form.confirm_password,
        &form.role,
    ];
    if required.iter().any(|field| is_blank(field)) {
        return reject("All fields are required");
    }

    if form.password != form.confirm_password {
        return reject("Passwords do not match");
    }

    let email = form.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return reject("Invalid email format");
    }

    if !is_strong_password(&form.password) {
        return reject(
            "Password must be at least 8 characters and include uppercase, lowercase, number, and special character",
        );
    }

    let Ok(role) = Role::from_str(form.role.trim()) else {
        return reject("Invalid role selection");
    };

    Ok(Registration {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email,
        password: form.password.clone(),
        role,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn validate_login(form: &LoginForm) -> Result<Credentials, ValidationError> {
    if is_blank(&form.email) || is_blank(&form.password) {
        return reject("Email and password are required");
    }
    Ok(Credentials {
        email: form.email.trim().to_lowercase(),
        password: form.password.clone(),
    })
}

// ═══════════════════════════════════════════════════════════
// Patient
// ═══════════════════════════════════════════════════════════

/// Patient demographics. `email` is absent on updates, where it is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatientForm {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub gender: String,
    pub date_of_birth: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidPatient {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
}

pub fn validate_patient(form: &PatientForm, today: NaiveDate) -> Result<ValidPatient, ValidationError> {
    if is_blank(&form.first_name) || is_blank(&form.last_name) {
        return reject("First name and last name are required");
    }

    let email = match &form.email {
        Some(email) => {
            let email = email.trim();
            if email.is_empty() {
                return reject("Email is required");
            }
            if !is_valid_email(email) {
                return reject("Invalid email format");
            }
            Some(email.to_string())
        }
        None => None,
    };

    if is_blank(&form.gender) {
        return reject("Gender is required");
    }
    let Ok(gender) = Gender::from_str(form.gender.trim()) else {
        return reject("Invalid gender selection");
    };

    if is_blank(&form.date_of_birth) {
        return reject("Date of birth is required");
    }
    let date_of_birth = parse_date(&form.date_of_birth)?;

    let age = age_on(date_of_birth, today);
    if age < 0 {
        return reject("Date of birth cannot be in the future");
    }
    if age > MAX_AGE_YEARS {
        return reject("Invalid age");
    }

    Ok(ValidPatient {
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email,
        gender,
        date_of_birth,
    })
}

// ═══════════════════════════════════════════════════════════
// Allergy
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AllergyForm {
    pub allergen: String,
    pub severity: String,
    pub date_added: String,
}

pub fn validate_allergy(form: &AllergyForm) -> Result<AllergyChanges, ValidationError> {
    if is_blank(&form.allergen) {
        return reject("Allergen is required");
    }

    let Ok(severity) = AllergySeverity::from_str(&form.severity) else {
        return reject("Invalid severity selection");
    };

    if is_blank(&form.date_added) {
        return reject("Date added is required");
    }
    let date_added = parse_date(&form.date_added)?;

    Ok(AllergyChanges {
        allergen: form.allergen.trim().to_string(),
        severity,
        date_added,
    })
}

// ═══════════════════════════════════════════════════════════
// Stroke-risk assessment
// ═══════════════════════════════════════════════════════════

/// Raw assessment fields exactly as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AssessmentForm {
    pub hypertension: String,
    pub ever_married: String,
    pub work_type: String,
    pub residence_type: String,
    pub avg_glucose_level: String,
    pub bmi: String,
    pub smoking_status: String,
    pub stroke: String,
}

fn parse_flag(value: &str, reason: &'static str) -> Result<bool, ValidationError> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => reject(reason),
    }
}

pub fn validate_assessment(
    patient_id: i64,
    form: &AssessmentForm,
) -> Result<NewAssessment, ValidationError> {
    let hypertension = parse_flag(&form.hypertension, "Hypertension must be 0 or 1")?;

    let Ok(ever_married) = EverMarried::from_str(&form.ever_married) else {
        return reject("Ever married must be No or Yes");
    };

    let Ok(work_type) = WorkType::from_str(&form.work_type) else {
        return reject("Invalid work type");
    };

    let Ok(residence_type) = ResidenceType::from_str(&form.residence_type) else {
        return reject("Residence type must be Rural or Urban");
    };

    let Some(avg_glucose_level) = parse_finite(&form.avg_glucose_level) else {
        return reject("Invalid glucose level");
    };
    if !(0.0..=300.0).contains(&avg_glucose_level) {
        return reject("Average glucose level must be between 0 and 300");
    }

    let Some(bmi) = parse_finite(&form.bmi) else {
        return reject("Invalid BMI");
    };
    if !(10.0..=100.0).contains(&bmi) {
        return reject("BMI must be between 10 and 100");
    }

    let Ok(smoking_status) = SmokingStatus::from_str(&form.smoking_status) else {
        return reject("Invalid smoking status");
    };

    let stroke = parse_flag(&form.stroke, "Stroke must be 0 or 1")?;

    Ok(NewAssessment {
        patient_id,
        hypertension,
        ever_married,
        work_type,
        residence_type,
        avg_glucose_level,
        bmi,
        smoking_status,
        stroke,
    })
}
