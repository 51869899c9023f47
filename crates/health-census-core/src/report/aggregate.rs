//! Pure aggregation over a record set.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Condition, Gender, PatientRecord};

/// Count per condition. Every condition has an entry, zeros included.
pub type ConditionCounts = BTreeMap<Condition, usize>;

/// Count per gender per condition. Every gender and condition has an entry.
pub type GenderConditionCounts = BTreeMap<Gender, ConditionCounts>;

fn zeroed_conditions() -> ConditionCounts {
    Condition::ALL.iter().map(|c| (*c, 0)).collect()
}

pub fn aggregate_by_condition(records: &[PatientRecord]) -> ConditionCounts {
    let mut counts = zeroed_conditions();
    for record in records {
        *counts.entry(record.condition).or_insert(0) += 1;
    }
    counts
}

pub fn aggregate_by_gender_and_condition(records: &[PatientRecord]) -> GenderConditionCounts {
    let mut counts: GenderConditionCounts =
        Gender::ALL.iter().map(|g| (*g, zeroed_conditions())).collect();
    for record in records {
        *counts
            .entry(record.gender)
            .or_insert_with(zeroed_conditions)
            .entry(record.condition)
            .or_insert(0) += 1;
    }
    counts
}

/// Sum of a gender's counts. A section is shown only when this is non-zero.
pub fn gender_total(counts: &ConditionCounts) -> usize {
    counts.values().sum()
}

/// `count / total` as a percentage with one decimal. Zero when `total` is zero.
pub fn percentage_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = count as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Distinct conditions present (0..=3).
pub fn unique_condition_count(records: &[PatientRecord]) -> usize {
    records
        .iter()
        .map(|r| r.condition)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Mean age, `None` for an empty set.
pub fn average_age(records: &[PatientRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let sum: u64 = records.iter().map(|r| u64::from(r.age)).sum();
    Some(sum as f64 / records.len() as f64)
}

/// Mean age rounded to the nearest year for display.
pub fn rounded_average_age(records: &[PatientRecord]) -> Option<u32> {
    average_age(records).map(|avg| avg.round() as u32)
}
