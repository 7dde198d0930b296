use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::enums::Gender;

#[derive(Debug, Clone, Serialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub created_by: i64,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn age_on(&self, today: NaiveDate) -> i32 {
        age_on(self.date_of_birth, today)
    }
}

/// Elapsed whole years between `date_of_birth` and `today`.
///
/// Negative when the birth date lies in the future.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let before_birthday = (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day());
    today.year() - date_of_birth.year() - i32::from(before_birthday)
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub created_by: i64,
}

/// Fields a doctor may change. Email and creator are fixed at creation.
#[derive(Debug, Clone)]
pub struct PatientUpdate {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn age_counts_full_year_on_and_after_birthday() {
        assert_eq!(age_on(d(1980, 6, 15), d(2024, 6, 15)), 44);
        assert_eq!(age_on(d(1980, 6, 14), d(2024, 6, 15)), 44);
    }

    #[test]
    fn age_is_one_less_before_birthday() {
        assert_eq!(age_on(d(1980, 6, 16), d(2024, 6, 15)), 43);
        assert_eq!(age_on(d(1980, 12, 31), d(2024, 1, 1)), 43);
    }

    #[test]
    fn future_birth_date_is_negative() {
        assert_eq!(age_on(d(2024, 6, 16), d(2024, 6, 15)), -1);
    }
}
