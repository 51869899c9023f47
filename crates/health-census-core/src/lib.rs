//! Health Census Core Library
//!
//! Local-first patient census: record entries, keep a per-day count, and derive
//! the report panel, chart series and recent-patients table from the record set.
//!
//! # Architecture
//!
//! ```text
//!   Census form ──validate──▶ Ledger ──whole-sequence write──▶ Storage port
//!                               │                              (SQLite / memory)
//!                               │
//!             ┌─────────────────┼──────────────────┐
//!             ▼                 ▼                  ▼
//!       Report panel       Live stats         CSV export
//!   (condition/gender)   (avg age, today)
//!
//!   Condition search ──▶ ReferenceSource (async) ──▶ find_condition
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (PatientRecord, Gender, Condition, ConditionReference)
//! - [`storage`]: Storage port with SQLite and in-memory adapters
//! - [`ledger`]: Patient ledger, daily counter, clock
//! - [`report`]: Aggregation, report panel, live stats, chart series
//! - [`export`]: CSV export
//! - [`reference`]: Condition reference lookup
//! - [`config`], [`logging`]: TOML configuration and tracing setup

pub mod config;
pub mod export;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod reference;
pub mod report;
pub mod storage;

// Re-export commonly used types
pub use config::CensusConfig;
pub use export::CsvExport;
pub use ledger::{Clock, DailyCounter, FixedClock, Ledger, LedgerError, SystemClock};
pub use models::{
    Condition, ConditionReference, Gender, PatientForm, PatientRecord, ReferenceDataset,
    ValidationError,
};
pub use reference::{
    find_condition, lookup_condition, search_condition, ConditionSearch, ReferenceSource,
    StaticSource, SUGGESTION_LIMIT,
};
pub use report::{CensusReport, ChartData, LiveStats};
pub use storage::{MemoryStorage, SqliteStorage, Storage};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum HealthCensusError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    EmptyDataset(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<storage::StorageError> for HealthCensusError {
    fn from(e: storage::StorageError) -> Self {
        HealthCensusError::StorageError(e.to_string())
    }
}

impl From<LedgerError> for HealthCensusError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Validation(v) => HealthCensusError::InvalidInput(v.to_string()),
            LedgerError::NotFound(id) => HealthCensusError::NotFound(id.to_string()),
            LedgerError::EmptyDataset => {
                HealthCensusError::EmptyDataset(LedgerError::EmptyDataset.to_string())
            }
            exhausted @ LedgerError::IdsExhausted(_) => {
                HealthCensusError::StorageError(exhausted.to_string())
            }
            LedgerError::Storage(s) => s.into(),
        }
    }
}

impl From<config::ConfigError> for HealthCensusError {
    fn from(e: config::ConfigError) -> Self {
        HealthCensusError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for HealthCensusError {
    fn from(e: serde_json::Error) -> Self {
        HealthCensusError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for HealthCensusError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        HealthCensusError::StorageError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a census database at the given path.
#[uniffi::export]
pub fn open_census(path: String) -> Result<Arc<HealthCensusCore>, HealthCensusError> {
    let storage = SqliteStorage::open(&path)?;
    HealthCensusCore::new(storage, config::ReportConfig::default().recent_limit)
}

/// Create an in-memory census (for testing).
#[uniffi::export]
pub fn open_census_in_memory() -> Result<Arc<HealthCensusCore>, HealthCensusError> {
    let storage = SqliteStorage::open_in_memory()?;
    HealthCensusCore::new(storage, config::ReportConfig::default().recent_limit)
}

/// Open the census described by a TOML configuration file.
///
/// Also installs logging at the configured level unless the host already has a
/// subscriber.
#[uniffi::export]
pub fn open_census_from_config(
    config_path: String,
) -> Result<Arc<HealthCensusCore>, HealthCensusError> {
    let config = CensusConfig::load(&config_path)?;
    logging::init_logging(&config.logging.level)?;
    let storage = config.storage.open()?;
    HealthCensusCore::new(storage, config.report.recent_limit)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe ledger wrapper for FFI.
#[derive(uniffi::Object)]
pub struct HealthCensusCore {
    ledger: Mutex<Ledger<SqliteStorage>>,
    recent_limit: usize,
}

impl HealthCensusCore {
    fn new(
        storage: SqliteStorage,
        recent_limit: usize,
    ) -> Result<Arc<Self>, HealthCensusError> {
        let ledger = Ledger::open(storage)?;
        Ok(Arc::new(Self {
            ledger: Mutex::new(ledger),
            recent_limit,
        }))
    }
}

#[uniffi::export]
impl HealthCensusCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Validate and record a patient.
    pub fn add_patient(
        &self,
        name: String,
        gender: Option<String>,
        age: Option<i64>,
        condition: Option<String>,
    ) -> Result<FfiPatientRecord, HealthCensusError> {
        let mut ledger = self.ledger.lock()?;
        let form = PatientForm {
            name,
            gender,
            age,
            condition,
        };
        let record = ledger.add_record(&form)?;
        Ok(record.into())
    }

    /// Delete a patient record by id.
    pub fn delete_patient(&self, id: u64) -> Result<FfiPatientRecord, HealthCensusError> {
        let mut ledger = self.ledger.lock()?;
        let record = ledger.delete_record(id)?;
        Ok(record.into())
    }

    /// Get a patient record by id.
    pub fn view_patient(&self, id: u64) -> Result<Option<FfiPatientRecord>, HealthCensusError> {
        let ledger = self.ledger.lock()?;
        Ok(ledger.get_record(id).cloned().map(Into::into))
    }

    /// Most recent records first, optionally capped.
    pub fn list_patients(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<FfiPatientRecord>, HealthCensusError> {
        let ledger = self.ledger.lock()?;
        let records = ledger.list_records(limit.map(|l| l as usize));
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Rows for the recent-patients table.
    pub fn recent_patients(&self) -> Result<Vec<FfiPatientRecord>, HealthCensusError> {
        let ledger = self.ledger.lock()?;
        let records = ledger.list_records(Some(self.recent_limit));
        Ok(records.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Report Operations
    // =========================================================================

    /// Conditions and gender breakdown.
    pub fn report(&self) -> Result<FfiCensusReport, HealthCensusError> {
        let ledger = self.ledger.lock()?;
        Ok(CensusReport::build(ledger.records()).into())
    }

    /// Headline statistics.
    pub fn live_stats(&self) -> Result<FfiLiveStats, HealthCensusError> {
        let ledger = self.ledger.lock()?;
        Ok(LiveStats::compute(ledger.records(), ledger.today_count()).into())
    }

    /// Condition series for the chart.
    pub fn chart_data(&self) -> Result<FfiChartData, HealthCensusError> {
        let ledger = self.ledger.lock()?;
        Ok(ChartData::from_records(ledger.records()).into())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Export all records as CSV.
    pub fn export_csv(&self) -> Result<FfiCsvExport, HealthCensusError> {
        let ledger = self.ledger.lock()?;
        Ok(ledger.export_file()?.into())
    }

    // =========================================================================
    // Reference Operations
    // =========================================================================

    /// Search a reference dataset document the host has retrieved.
    ///
    /// On a miss the result carries the closest condition names instead.
    pub fn search_reference(
        &self,
        dataset_json: String,
        query: String,
    ) -> Result<FfiSearchResult, HealthCensusError> {
        if query.trim().is_empty() {
            return Err(HealthCensusError::InvalidInput(
                reference::LookupError::EmptyQuery.to_string(),
            ));
        }
        let dataset = ReferenceDataset::from_json(&dataset_json)?;
        Ok(search_condition(&dataset, &query, SUGGESTION_LIMIT).into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientRecord {
    pub id: u64,
    pub name: String,
    pub gender: String,
    pub age: u8,
    pub condition: String,
    /// RFC 3339 creation instant
    pub created_at: String,
    /// Local timestamp for tables
    pub display_date: String,
}

impl From<PatientRecord> for FfiPatientRecord {
    fn from(record: PatientRecord) -> Self {
        Self {
            id: record.id,
            display_date: record.display_date(),
            name: record.name,
            gender: record.gender.label().to_string(),
            age: record.age,
            condition: record.condition.label().to_string(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// FFI-safe condition line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiConditionLine {
    pub condition: String,
    pub count: u32,
    pub percentage: f64,
}

/// FFI-safe count pair.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiConditionCount {
    pub condition: String,
    pub count: u32,
}

/// FFI-safe gender section.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiGenderSection {
    pub gender: String,
    pub total: u32,
    pub conditions: Vec<FfiConditionCount>,
}

/// FFI-safe report. `is_empty` marks the "no data" state.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCensusReport {
    pub is_empty: bool,
    pub total: u32,
    pub conditions: Vec<FfiConditionLine>,
    pub genders: Vec<FfiGenderSection>,
}

impl From<CensusReport> for FfiCensusReport {
    fn from(report: CensusReport) -> Self {
        match report {
            CensusReport::Empty => Self {
                is_empty: true,
                total: 0,
                conditions: Vec::new(),
                genders: Vec::new(),
            },
            CensusReport::Populated {
                total,
                conditions,
                genders,
            } => Self {
                is_empty: false,
                total: total as u32,
                conditions: conditions
                    .into_iter()
                    .map(|line| FfiConditionLine {
                        condition: line.condition.label().to_string(),
                        count: line.count as u32,
                        percentage: line.percentage,
                    })
                    .collect(),
                genders: genders
                    .into_iter()
                    .map(|section| FfiGenderSection {
                        gender: section.gender.label().to_string(),
                        total: section.total as u32,
                        conditions: section
                            .conditions
                            .into_iter()
                            .map(|(condition, count)| FfiConditionCount {
                                condition: condition.label().to_string(),
                                count: count as u32,
                            })
                            .collect(),
                    })
                    .collect(),
            },
        }
    }
}

/// FFI-safe live statistics.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLiveStats {
    pub total: u32,
    pub average_age: Option<u32>,
    pub unique_conditions: u32,
    pub today_count: u32,
}

impl From<LiveStats> for FfiLiveStats {
    fn from(stats: LiveStats) -> Self {
        Self {
            total: stats.total as u32,
            average_age: stats.average_age,
            unique_conditions: stats.unique_conditions as u32,
            today_count: stats.today_count,
        }
    }
}

/// FFI-safe chart series.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiChartData {
    pub labels: Vec<String>,
    pub values: Vec<u32>,
    pub percentages: Vec<f64>,
}

impl From<ChartData> for FfiChartData {
    fn from(chart: ChartData) -> Self {
        Self {
            labels: chart.labels,
            values: chart.values.into_iter().map(|v| v as u32).collect(),
            percentages: chart.percentages,
        }
    }
}

/// FFI-safe CSV export.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCsvExport {
    pub file_name: String,
    pub mime_type: String,
    pub content: String,
}

impl From<CsvExport> for FfiCsvExport {
    fn from(export: CsvExport) -> Self {
        Self {
            file_name: export.file_name,
            mime_type: export.mime_type,
            content: export.content,
        }
    }
}

/// FFI-safe condition reference.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiConditionReference {
    pub name: String,
    pub symptoms: Vec<String>,
    pub prevention: Vec<String>,
    pub treatment: String,
    pub image_ref: String,
}

impl From<ConditionReference> for FfiConditionReference {
    fn from(reference: ConditionReference) -> Self {
        Self {
            name: reference.name,
            symptoms: reference.symptoms,
            prevention: reference.prevention,
            treatment: reference.treatment,
            image_ref: reference.image_ref,
        }
    }
}

/// FFI-safe search outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSearchResult {
    pub found: Option<FfiConditionReference>,
    /// Names to try when nothing matched.
    pub suggestions: Vec<String>,
}

impl From<ConditionSearch> for FfiSearchResult {
    fn from(search: ConditionSearch) -> Self {
        Self {
            found: search.found.map(Into::into),
            suggestions: search.suggestions,
        }
    }
}
