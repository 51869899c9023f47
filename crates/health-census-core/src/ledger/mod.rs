//! Patient ledger: the session's single source of truth.
//!
//! Records live in memory in insertion order and the whole sequence is written
//! back through the [`Storage`] port on every mutation, together with the
//! [`DailyCounter`]. A failed write leaves the in-memory state untouched.

mod clock;
mod counter;

pub use clock::*;
pub use counter::*;

use thiserror::Error;

use crate::export::{self, CsvExport};
use crate::models::{PatientForm, PatientRecord, ValidationError};
use crate::storage::{Storage, StorageError, StorageResult, PATIENTS_KEY};

/// Ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Patient record not found: {0}")]
    NotFound(u64),

    #[error("No data to export")]
    EmptyDataset,

    #[error("No patient id left after {0}")]
    IdsExhausted(u64),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// In-memory patient records mirrored to storage.
pub struct Ledger<S, C = SystemClock> {
    storage: S,
    clock: C,
    records: Vec<PatientRecord>,
    counter: DailyCounter,
    last_id: u64,
}

impl<S: Storage> Ledger<S, SystemClock> {
    /// Load the ledger using the wall clock.
    pub fn open(storage: S) -> LedgerResult<Self> {
        Self::with_clock(storage, SystemClock)
    }
}

impl<S: Storage, C: Clock> Ledger<S, C> {
    /// Load records and the daily counter from storage.
    pub fn with_clock(mut storage: S, clock: C) -> LedgerResult<Self> {
        let records = load_records(&storage)?;
        let counter = DailyCounter::load(&mut storage, clock.today())?;
        let last_id = records.iter().map(|r| r.id).max().unwrap_or(0);

        tracing::info!(
            records = records.len(),
            today_count = counter.count(),
            "Patient ledger loaded"
        );

        Ok(Self {
            storage,
            clock,
            records,
            counter,
            last_id,
        })
    }

    /// Validate and append a record.
    pub fn add_record(&mut self, form: &PatientForm) -> LedgerResult<PatientRecord> {
        let patient = form.validate().map_err(|e| {
            tracing::debug!(error = %e, "Rejected patient form");
            e
        })?;

        let now = self.clock.now();
        let today = self.clock.today();
        let id = self.next_id(now.timestamp_millis())?;
        let record = PatientRecord::new(id, patient, now);

        let mut counter = self.counter.clone();
        counter.roll_over(today);
        if record.local_date() == today {
            counter.increment(today);
        }

        self.records.push(record.clone());
        if let Err(e) = self.persist(&counter) {
            self.records.pop();
            tracing::warn!(error = %e, "Failed to persist new patient record");
            return Err(e.into());
        }
        self.counter = counter;
        self.last_id = id;

        tracing::info!(
            id,
            condition = record.condition.label(),
            total = self.records.len(),
            today_count = self.counter.count(),
            "Patient record added"
        );

        Ok(record)
    }

    /// Remove the first record with `id`.
    pub fn delete_record(&mut self, id: u64) -> LedgerResult<PatientRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(LedgerError::NotFound(id))?;

        let today = self.clock.today();
        let removed = self.records.remove(index);

        let mut counter = self.counter.clone();
        counter.roll_over(today);
        if removed.local_date() == today {
            counter.decrement(today);
        }

        if let Err(e) = self.persist(&counter) {
            self.records.insert(index, removed);
            tracing::warn!(error = %e, id, "Failed to persist patient deletion");
            return Err(e.into());
        }
        self.counter = counter;

        tracing::info!(
            id,
            total = self.records.len(),
            today_count = self.counter.count(),
            "Patient record deleted"
        );

        Ok(removed)
    }

    /// Look up a record by id.
    pub fn get_record(&self, id: u64) -> Option<&PatientRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Records, most recent first, optionally capped to `limit`.
    pub fn list_records(&self, limit: Option<usize>) -> Vec<PatientRecord> {
        self.records
            .iter()
            .rev()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records created today. Zero once the day has turned over.
    pub fn today_count(&self) -> u32 {
        match self.counter.state(self.clock.today()) {
            CounterState::Current => self.counter.count(),
            CounterState::Stale => 0,
        }
    }

    /// CSV of all records in insertion order.
    pub fn export_csv(&self) -> LedgerResult<String> {
        if self.records.is_empty() {
            return Err(LedgerError::EmptyDataset);
        }
        Ok(export::to_csv(&self.records))
    }

    /// CSV plus the download name and MIME type.
    pub fn export_file(&self) -> LedgerResult<CsvExport> {
        let content = self.export_csv()?;
        let export = CsvExport::new(self.clock.now().date_naive(), content);
        tracing::info!(
            file_name = %export.file_name,
            records = self.records.len(),
            "Patient data exported"
        );
        Ok(export)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Release the storage, e.g. to reopen it.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Timestamp id, bumped past the last issued id.
    fn next_id(&self, now_ms: i64) -> LedgerResult<u64> {
        let now_ms = u64::try_from(now_ms).unwrap_or(0);
        let next = self
            .last_id
            .checked_add(1)
            .ok_or(LedgerError::IdsExhausted(self.last_id))?;
        Ok(now_ms.max(next))
    }

    fn persist(&mut self, counter: &DailyCounter) -> StorageResult<()> {
        let patients = serde_json::to_string(&self.records)?;
        let [date_entry, count_entry] = counter.entries();
        self.storage
            .save_batch(&[(PATIENTS_KEY, patients), date_entry, count_entry])
    }
}

fn load_records<S: Storage>(storage: &S) -> StorageResult<Vec<PatientRecord>> {
    match storage.load(PATIENTS_KEY)? {
        None => Ok(Vec::new()),
        Some(json) => serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
            key: PATIENTS_KEY.to_string(),
            reason: e.to_string(),
        }),
    }
}
