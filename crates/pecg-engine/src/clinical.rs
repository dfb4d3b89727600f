//! Clinical data model
//!
//! The minimal slice of the host platform's record model that the PECG
//! cohorts read: patients, visits, program enrollments, and the reference
//! entities (programs, visit types) the setup entry point resolves.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Recorded sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

/// A patient record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Patient identifier
    pub patient_id: i32,
    /// Birth date, if recorded
    pub birthdate: Option<NaiveDate>,
    /// Recorded sex, if any
    pub sex: Option<Sex>,
    /// Voided records are invisible to every cohort
    pub voided: bool,
}

impl Patient {
    /// Create an unvoided patient with no birthdate or sex
    pub fn new(patient_id: i32) -> Self {
        Self {
            patient_id,
            birthdate: None,
            sex: None,
            voided: false,
        }
    }

    /// Set the birth date
    pub fn born(mut self, birthdate: NaiveDate) -> Self {
        self.birthdate = Some(birthdate);
        self
    }

    /// Set the recorded sex
    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    /// Mark the record voided
    pub fn mark_voided(mut self) -> Self {
        self.voided = true;
        self
    }

    /// Computed age in whole years at the reference date, if defined
    pub fn age_at(&self, as_of: NaiveDate) -> Option<i32> {
        self.birthdate.and_then(|birthdate| age_in_years(birthdate, as_of))
    }
}

/// A visit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    /// Visit identifier
    pub visit_id: i32,
    /// Patient the visit belongs to
    pub patient_id: i32,
    /// Visit type identifier
    pub visit_type_id: i32,
    /// Date the visit started
    pub date_started: NaiveDate,
    /// Voided records are invisible to every cohort
    pub voided: bool,
}

impl Visit {
    /// Create an unvoided visit
    pub fn new(visit_id: i32, patient_id: i32, visit_type_id: i32, date_started: NaiveDate) -> Self {
        Self {
            visit_id,
            patient_id,
            visit_type_id,
            date_started,
            voided: false,
        }
    }

    /// Mark the record voided
    pub fn mark_voided(mut self) -> Self {
        self.voided = true;
        self
    }
}

/// A program enrollment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramEnrollment {
    /// Patient enrolled
    pub patient_id: i32,
    /// Program enrolled in
    pub program_id: i32,
    /// Enrollment date
    pub date_enrolled: NaiveDate,
    /// Completion date; `None` while the enrollment is active
    pub date_completed: Option<NaiveDate>,
    /// Voided records are invisible to every cohort
    pub voided: bool,
}

impl ProgramEnrollment {
    /// Create an active, unvoided enrollment
    pub fn new(patient_id: i32, program_id: i32, date_enrolled: NaiveDate) -> Self {
        Self {
            patient_id,
            program_id,
            date_enrolled,
            date_completed: None,
            voided: false,
        }
    }

    /// Set the completion date
    pub fn completed(mut self, date_completed: NaiveDate) -> Self {
        self.date_completed = Some(date_completed);
        self
    }

    /// Mark the record voided
    pub fn mark_voided(mut self) -> Self {
        self.voided = true;
        self
    }
}

/// A clinical program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Program identifier
    pub program_id: i32,
    /// Display name
    pub name: String,
}

impl Program {
    /// Create a program
    pub fn new(program_id: i32, name: impl Into<String>) -> Self {
        Self {
            program_id,
            name: name.into(),
        }
    }
}

/// A visit type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitType {
    /// Visit type identifier
    pub visit_type_id: i32,
    /// Display name
    pub name: String,
    /// Stable external identifier
    pub uuid: String,
}

impl VisitType {
    /// Create a visit type
    pub fn new(visit_type_id: i32, name: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            visit_type_id,
            name: name.into(),
            uuid: uuid.into(),
        }
    }
}

/// Whole calendar years elapsed from `birthdate` to `as_of`
///
/// The count decrements by one when the birthday has not yet occurred in
/// the `as_of` year. Returns `None` when `as_of` precedes the birth date.
pub fn age_in_years(birthdate: NaiveDate, as_of: NaiveDate) -> Option<i32> {
    let mut age = as_of.year() - birthdate.year();
    if (as_of.month(), as_of.day()) < (birthdate.month(), birthdate.day()) {
        age -= 1;
    }
    if age < 0 { None } else { Some(age) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let birthdate = date(2000, 6, 15);
        assert_eq!(age_in_years(birthdate, date(2024, 6, 14)), Some(23));
        assert_eq!(age_in_years(birthdate, date(2024, 6, 15)), Some(24));
        assert_eq!(age_in_years(birthdate, date(2024, 6, 16)), Some(24));
    }

    #[test]
    fn test_age_under_one_year() {
        let birthdate = date(2024, 1, 10);
        assert_eq!(age_in_years(birthdate, date(2024, 12, 31)), Some(0));
        assert_eq!(age_in_years(birthdate, date(2025, 1, 10)), Some(1));
    }

    #[test]
    fn test_age_undefined_before_birth() {
        let birthdate = date(2024, 1, 10);
        assert_eq!(age_in_years(birthdate, date(2023, 12, 31)), None);
    }

    #[test]
    fn test_leap_day_birthday() {
        let birthdate = date(2020, 2, 29);
        // In a non-leap year the birthday has not occurred on Feb 28.
        assert_eq!(age_in_years(birthdate, date(2021, 2, 28)), Some(0));
        assert_eq!(age_in_years(birthdate, date(2021, 3, 1)), Some(1));
    }
}
