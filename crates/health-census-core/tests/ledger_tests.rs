//! Ledger integration tests.
//!
//! These tests drive the ledger through storage and a fixed clock the way a
//! census session would.

use chrono::{DateTime, Duration, Utc};
use health_census_core::ledger::{FixedClock, Ledger, LedgerError};
use health_census_core::models::{Condition, Gender, PatientForm};
use health_census_core::report::{
    aggregate_by_condition, average_age, rounded_average_age, unique_condition_count,
};
use health_census_core::storage::{MemoryStorage, SqliteStorage, Storage, TODAY_PATIENTS_KEY};
use health_census_core::{CensusReport, LiveStats};

fn start() -> DateTime<Utc> {
    "2026-10-19T12:00:00Z".parse().unwrap()
}

fn new_ledger() -> Ledger<MemoryStorage, FixedClock> {
    Ledger::with_clock(MemoryStorage::new(), FixedClock::new(start())).unwrap()
}

fn add(
    ledger: &mut Ledger<MemoryStorage, FixedClock>,
    name: &str,
    gender: Gender,
    age: i64,
    condition: Condition,
) -> u64 {
    ledger
        .add_record(&PatientForm::new(name, gender, age, condition))
        .unwrap()
        .id
}

#[test]
fn test_three_patient_scenario() {
    let mut ledger = new_ledger();
    add(&mut ledger, "Alice", Gender::Female, 30, Condition::Diabetes);
    add(&mut ledger, "Bob", Gender::Male, 45, Condition::Thyroid);
    add(&mut ledger, "Carol", Gender::Female, 60, Condition::Diabetes);

    let counts = aggregate_by_condition(ledger.records());
    assert_eq!(counts[&Condition::Diabetes], 2);
    assert_eq!(counts[&Condition::Thyroid], 1);
    assert_eq!(counts[&Condition::HighBloodPressure], 0);

    assert_eq!(unique_condition_count(ledger.records()), 2);
    assert_eq!(average_age(ledger.records()), Some(45.0));
    assert_eq!(rounded_average_age(ledger.records()), Some(45));

    let stats = LiveStats::compute(ledger.records(), ledger.today_count());
    assert_eq!(stats.total, 3);
    assert_eq!(stats.today_count, 3);

    match CensusReport::build(ledger.records()) {
        CensusReport::Populated { conditions, genders, .. } => {
            assert_eq!(conditions.len(), 2);
            assert_eq!(conditions[0].percentage, 66.7);
            assert_eq!(conditions[1].percentage, 33.3);
            assert_eq!(genders.len(), 2);
        }
        CensusReport::Empty => panic!("expected populated report"),
    }
}

#[test]
fn test_add_then_list_has_one_more_matching_record() {
    let mut ledger = new_ledger();
    add(&mut ledger, "Alice", Gender::Female, 30, Condition::Diabetes);
    let before = ledger.list_records(None).len();

    let record = ledger
        .add_record(&PatientForm::new("Dev", Gender::Male, 120, Condition::HighBloodPressure))
        .unwrap();

    let after = ledger.list_records(None);
    assert_eq!(after.len(), before + 1);
    assert_eq!(after[0], record);
    assert_eq!(record.name, "Dev");
    assert_eq!(record.gender, Gender::Male);
    assert_eq!(record.age, 120);
    assert_eq!(record.condition, Condition::HighBloodPressure);
}

#[test]
fn test_age_boundaries() {
    let mut ledger = new_ledger();
    for age in [0, 121] {
        let form = PatientForm::new("X", Gender::Male, age, Condition::Thyroid);
        let result = ledger.add_record(&form);
        assert!(matches!(result, Err(LedgerError::Validation(_))), "age {}", age);
    }
    for age in [1, 120] {
        assert!(ledger
            .add_record(&PatientForm::new("X", Gender::Male, age, Condition::Thyroid))
            .is_ok());
    }
    assert_eq!(ledger.len(), 2);
}

#[test]
fn test_list_most_recent_first_with_limit() {
    let mut ledger = new_ledger();
    for i in 0..12 {
        add(&mut ledger, &format!("P{}", i), Gender::Female, 20 + i, Condition::Thyroid);
        ledger.clock().advance(Duration::seconds(1));
    }

    let recent = ledger.list_records(Some(10));
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0].name, "P11");
    assert_eq!(recent[9].name, "P2");

    let insertion: Vec<&str> = ledger.records().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(insertion[0], "P0");
}

#[test]
fn test_delete_today_decrements_counter() {
    let mut ledger = new_ledger();
    let a = add(&mut ledger, "Alice", Gender::Female, 30, Condition::Diabetes);
    let b = add(&mut ledger, "Bob", Gender::Male, 45, Condition::Thyroid);
    assert_eq!(ledger.today_count(), 2);

    let removed = ledger.delete_record(a).unwrap();
    assert_eq!(removed.name, "Alice");
    assert_eq!(ledger.today_count(), 1);
    assert!(ledger.get_record(a).is_none());
    assert!(ledger.get_record(b).is_some());
}

#[test]
fn test_delete_prior_day_leaves_counter() {
    let mut ledger = new_ledger();
    let old = add(&mut ledger, "Alice", Gender::Female, 30, Condition::Diabetes);

    ledger.clock().advance(Duration::days(2));
    add(&mut ledger, "Bob", Gender::Male, 45, Condition::Thyroid);
    assert_eq!(ledger.today_count(), 1);

    ledger.delete_record(old).unwrap();
    assert_eq!(ledger.today_count(), 1);
}

#[test]
fn test_counter_never_below_zero() {
    let mut ledger = new_ledger();
    let id = add(&mut ledger, "Alice", Gender::Female, 30, Condition::Diabetes);

    // Counter out of step with the records, e.g. edited by hand.
    let mut storage = ledger.into_storage();
    storage.save(TODAY_PATIENTS_KEY, "0").unwrap();
    let mut ledger = Ledger::with_clock(storage, FixedClock::new(start())).unwrap();
    assert_eq!(ledger.today_count(), 0);

    ledger.delete_record(id).unwrap();
    assert_eq!(ledger.today_count(), 0);
    assert_eq!(
        ledger.storage().load(TODAY_PATIENTS_KEY).unwrap(),
        Some("0".into())
    );
}

#[test]
fn test_reload_restores_records_and_counter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("census.db");

    let (a, b) = {
        let storage = SqliteStorage::open(&path).unwrap();
        let mut ledger = Ledger::with_clock(storage, FixedClock::new(start())).unwrap();
        let a = ledger
            .add_record(&PatientForm::new("Alice", Gender::Female, 30, Condition::Diabetes))
            .unwrap();
        let b = ledger
            .add_record(&PatientForm::new("Bob", Gender::Male, 45, Condition::Thyroid))
            .unwrap();
        (a, b)
    };

    let storage = SqliteStorage::open(&path).unwrap();
    let clock = FixedClock::new(start() + Duration::minutes(1));
    let ledger = Ledger::with_clock(storage, clock).unwrap();
    assert_eq!(ledger.records(), &[a.clone(), b.clone()]);
    assert_eq!(ledger.today_count(), 2);

    // New ids keep increasing past what was loaded.
    let mut ledger = ledger;
    let c = ledger
        .add_record(&PatientForm::new("Carol", Gender::Female, 60, Condition::Diabetes))
        .unwrap();
    assert!(c.id > b.id);

    // A later day starts from zero.
    let storage = ledger.into_storage();
    let ledger = Ledger::with_clock(storage, FixedClock::new(start() + Duration::days(1))).unwrap();
    assert_eq!(ledger.today_count(), 0);
    assert_eq!(ledger.len(), 3);
}

#[test]
fn test_csv_round_trip() {
    let mut ledger = new_ledger();
    add(&mut ledger, "Alice", Gender::Female, 30, Condition::Diabetes);
    ledger.clock().advance(Duration::minutes(5));
    add(&mut ledger, "Bob", Gender::Male, 45, Condition::HighBloodPressure);

    let csv = ledger.export_csv().unwrap();
    let mut lines = csv.split('\n');
    assert_eq!(lines.next(), Some("ID,Name,Gender,Age,Condition,Date"));

    for (line, record) in lines.zip(ledger.records()) {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[0].parse::<u64>().unwrap(), record.id);
        assert_eq!(fields[1], record.name);
        assert_eq!(fields[2], record.gender.label());
        assert_eq!(fields[3].parse::<u8>().unwrap(), record.age);
        assert_eq!(Condition::parse(fields[4]), Some(record.condition));
        assert_eq!(fields[5], record.display_date());
    }
}
