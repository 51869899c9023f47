//! Patient models.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Youngest accepted patient age.
pub const MIN_AGE: i64 = 1;
/// Oldest accepted patient age.
pub const MAX_AGE: i64 = 120;

/// Patient gender as captured by the census form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// All genders in report order.
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Display label (also the persisted form).
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    /// Parse form input (case-insensitive, surrounding whitespace ignored).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// One of the tracked diagnoses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Condition {
    Diabetes,
    Thyroid,
    #[serde(rename = "High Blood Pressure", alias = "HighBloodPressure")]
    HighBloodPressure,
}

impl Condition {
    /// All conditions in report order.
    pub const ALL: [Condition; 3] = [
        Condition::Diabetes,
        Condition::Thyroid,
        Condition::HighBloodPressure,
    ];

    /// Display label (also the persisted form).
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Diabetes => "Diabetes",
            Condition::Thyroid => "Thyroid",
            Condition::HighBloodPressure => "High Blood Pressure",
        }
    }

    /// Parse form input. Accepts the display label or the compact variant name.
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        match key.as_str() {
            "diabetes" => Some(Condition::Diabetes),
            "thyroid" => Some(Condition::Thyroid),
            "highbloodpressure" => Some(Condition::HighBloodPressure),
            _ => None,
        }
    }
}

/// Form validation failures, checked in form order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter patient name")]
    MissingName,

    #[error("Please select gender")]
    InvalidGender,

    #[error("Please enter valid age (1-120)")]
    InvalidAge,

    #[error("Please select a condition")]
    InvalidCondition,
}

/// Raw census form input, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientForm {
    pub name: String,
    pub gender: Option<String>,
    pub age: Option<i64>,
    pub condition: Option<String>,
}

/// Form input that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPatient {
    pub name: String,
    pub gender: Gender,
    pub age: u8,
    pub condition: Condition,
}

impl PatientForm {
    /// Build a form from already-typed values.
    pub fn new(name: impl Into<String>, gender: Gender, age: i64, condition: Condition) -> Self {
        Self {
            name: name.into(),
            gender: Some(gender.label().to_string()),
            age: Some(age),
            condition: Some(condition.label().to_string()),
        }
    }

    /// Validate the form. Presence and range checks only.
    pub fn validate(&self) -> Result<ValidatedPatient, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let gender = self
            .gender
            .as_deref()
            .and_then(Gender::parse)
            .ok_or(ValidationError::InvalidGender)?;

        let age = match self.age {
            Some(age) if (MIN_AGE..=MAX_AGE).contains(&age) => age as u8,
            _ => return Err(ValidationError::InvalidAge),
        };

        let condition = self
            .condition
            .as_deref()
            .and_then(Condition::parse)
            .ok_or(ValidationError::InvalidCondition)?;

        Ok(ValidatedPatient {
            name: name.to_string(),
            gender,
            age,
            condition,
        })
    }
}

/// A committed patient entry. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    /// Millisecond creation timestamp, bumped to stay unique
    pub id: u64,
    /// Patient name (trimmed)
    pub name: String,
    pub gender: Gender,
    /// Age in years, 1..=120
    pub age: u8,
    pub condition: Condition,
    /// Creation instant
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

impl PatientRecord {
    /// Create a record from validated input.
    pub fn new(id: u64, patient: ValidatedPatient, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: patient.name,
            gender: patient.gender,
            age: patient.age,
            condition: patient.condition,
            created_at,
        }
    }

    /// Local calendar day the record was created on.
    pub fn local_date(&self) -> NaiveDate {
        self.created_at.with_timezone(&Local).date_naive()
    }

    /// Local timestamp used in tables and exports.
    pub fn display_date(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(
        name: &str,
        gender: Option<&str>,
        age: Option<i64>,
        condition: Option<&str>,
    ) -> PatientForm {
        PatientForm {
            name: name.into(),
            gender: gender.map(Into::into),
            age,
            condition: condition.map(Into::into),
        }
    }

    #[test]
    fn test_validate_trims_name() {
        let valid = form("  Alice ", Some("Female"), Some(30), Some("Diabetes"))
            .validate()
            .unwrap();
        assert_eq!(valid.name, "Alice");
        assert_eq!(valid.gender, Gender::Female);
        assert_eq!(valid.age, 30);
        assert_eq!(valid.condition, Condition::Diabetes);
    }

    #[test]
    fn test_validation_order() {
        assert_eq!(
            form("   ", None, None, None).validate(),
            Err(ValidationError::MissingName)
        );
        assert_eq!(
            form("Bob", Some("other"), Some(30), Some("Thyroid")).validate(),
            Err(ValidationError::InvalidGender)
        );
        assert_eq!(
            form("Bob", Some("Male"), None, Some("Thyroid")).validate(),
            Err(ValidationError::InvalidAge)
        );
        assert_eq!(
            form("Bob", Some("Male"), Some(40), None).validate(),
            Err(ValidationError::InvalidCondition)
        );
    }

    #[test]
    fn test_age_boundaries() {
        for (age, ok) in [(0, false), (1, true), (120, true), (121, false), (-5, false)] {
            let result = form("Carol", Some("Female"), Some(age), Some("Thyroid")).validate();
            assert_eq!(result.is_ok(), ok, "age {}", age);
        }
    }

    #[test]
    fn test_condition_parse_variants() {
        assert_eq!(
            Condition::parse("High Blood Pressure"),
            Some(Condition::HighBloodPressure)
        );
        assert_eq!(
            Condition::parse("highbloodpressure"),
            Some(Condition::HighBloodPressure)
        );
        assert_eq!(Condition::parse("asthma"), None);
    }

    #[test]
    fn test_record_serializes_original_field_names() {
        let created_at = "2026-10-19T08:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let record = PatientRecord::new(
            1_792_400_000_000,
            form("Dana", Some("female"), Some(52), Some("High Blood Pressure"))
                .validate()
                .unwrap(),
            created_at,
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["condition"], "High Blood Pressure");
        assert_eq!(json["gender"], "Female");
        assert!(json["date"].as_str().unwrap().starts_with("2026-10-19T08:30:00"));

        let back: PatientRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
