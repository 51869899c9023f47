//! Report aggregation: condition and gender breakdowns, live statistics and
//! chart series, all recomputed from the current record set.

mod aggregate;

pub use aggregate::*;

use serde::{Deserialize, Serialize};

use crate::models::{Condition, Gender, PatientRecord};

/// One line of the conditions breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionLine {
    pub condition: Condition,
    pub count: usize,
    /// Share of all records, one decimal
    pub percentage: f64,
}

/// Per-gender section of the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenderSection {
    pub gender: Gender,
    pub total: usize,
    /// Non-zero conditions only
    pub conditions: Vec<(Condition, usize)>,
}

/// The report panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CensusReport {
    /// No records yet.
    Empty,
    Populated {
        total: usize,
        conditions: Vec<ConditionLine>,
        genders: Vec<GenderSection>,
    },
}

impl CensusReport {
    /// Build the report. Zero-count conditions and zero-total genders are left out.
    pub fn build(records: &[PatientRecord]) -> Self {
        if records.is_empty() {
            return CensusReport::Empty;
        }

        let total = records.len();

        let conditions = aggregate_by_condition(records)
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(condition, count)| ConditionLine {
                condition,
                count,
                percentage: percentage_of(count, total),
            })
            .collect();

        let genders = aggregate_by_gender_and_condition(records)
            .into_iter()
            .filter_map(|(gender, counts)| {
                let gender_sum = gender_total(&counts);
                if gender_sum == 0 {
                    return None;
                }
                Some(GenderSection {
                    gender,
                    total: gender_sum,
                    conditions: counts.into_iter().filter(|(_, n)| *n > 0).collect(),
                })
            })
            .collect();

        CensusReport::Populated {
            total,
            conditions,
            genders,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CensusReport::Empty)
    }
}

/// Headline numbers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LiveStats {
    pub total: usize,
    /// Rounded mean age, absent with no records
    pub average_age: Option<u32>,
    pub unique_conditions: usize,
    pub today_count: u32,
}

impl LiveStats {
    pub fn compute(records: &[PatientRecord], today_count: u32) -> Self {
        Self {
            total: records.len(),
            average_age: rounded_average_age(records),
            unique_conditions: unique_condition_count(records),
            today_count,
        }
    }
}

/// Condition series for the chart: all conditions, zeros included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
    /// Slice share for tooltips, one decimal
    pub percentages: Vec<f64>,
}

impl ChartData {
    pub fn from_records(records: &[PatientRecord]) -> Self {
        let counts = aggregate_by_condition(records);
        let total: usize = counts.values().sum();

        let mut chart = ChartData {
            labels: Vec::with_capacity(counts.len()),
            values: Vec::with_capacity(counts.len()),
            percentages: Vec::with_capacity(counts.len()),
        };
        for (condition, count) in counts {
            chart.labels.push(condition.label().to_string());
            chart.values.push(count);
            chart.percentages.push(percentage_of(count, total));
        }
        chart
    }
}
