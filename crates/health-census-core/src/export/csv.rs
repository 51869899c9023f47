//! CSV export of patient records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::PatientRecord;

/// Column header row.
pub const CSV_HEADER: &str = "ID,Name,Gender,Age,Condition,Date";

/// MIME type of the export artifact.
pub const CSV_MIME_TYPE: &str = "text/csv";

/// A ready-to-download export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CsvExport {
    /// `health_census_data_<YYYY-MM-DD>.csv`
    pub file_name: String,
    pub mime_type: String,
    pub content: String,
}

impl CsvExport {
    pub fn new(date: NaiveDate, content: String) -> Self {
        Self {
            file_name: export_file_name(date),
            mime_type: CSV_MIME_TYPE.to_string(),
            content,
        }
    }
}

/// Download name for an export taken on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("health_census_data_{}.csv", date.format("%Y-%m-%d"))
}

/// Header plus one row per record, in the given order, newline-joined.
pub fn to_csv(records: &[PatientRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for record in records {
        lines.push(format!(
            "{},{},{},{},{},{}",
            record.id,
            escape_csv(&record.name),
            record.gender.label(),
            record.age,
            escape_csv(record.condition.label()),
            escape_csv(&record.display_date()),
        ));
    }

    lines.join("\n")
}

/// Escape a CSV field.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Condition, Gender, PatientForm};

    fn record(id: u64, name: &str) -> PatientRecord {
        let patient = PatientForm::new(name, Gender::Male, 45, Condition::HighBloodPressure)
            .validate()
            .unwrap();
        PatientRecord::new(id, patient, "2026-10-19T09:15:00Z".parse().unwrap())
    }

    #[test]
    fn test_header_only_for_no_records() {
        assert_eq!(to_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn test_row_layout() {
        let r = record(1_792_400_000_000, "Bob");
        let csv = to_csv(&[r.clone()]);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            format!(
                "1792400000000,Bob,Male,45,High Blood Pressure,{}",
                r.display_date()
            )
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("Smith, John"), "\"Smith, John\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("plain"), "plain");
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(export_file_name(date), "health_census_data_2026-01-05.csv");
        let export = CsvExport::new(date, "x".into());
        assert_eq!(export.mime_type, CSV_MIME_TYPE);
    }
}
