//! Per-day count of created records.
//!
//! The counter is either [`CounterState::Current`] (its date stamp is today) or
//! [`CounterState::Stale`]. Loading or rolling over a stale counter resets it to
//! zero under today's date. Increments and decrements only apply while current.

use chrono::NaiveDate;

use crate::storage::{Storage, StorageResult, LAST_VISIT_DATE_KEY, TODAY_PATIENTS_KEY};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether the counter's date stamp matches today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterState {
    Stale,
    Current,
}

/// Count of records created on `date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCounter {
    date: NaiveDate,
    count: u32,
}

impl DailyCounter {
    /// A zeroed counter for `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today,
            count: 0,
        }
    }

    /// Restore from storage, resetting when the stored date is not `today`.
    ///
    /// The reset is persisted immediately. A missing or unparseable count on a
    /// current date loads as zero.
    pub fn load<S: Storage>(storage: &mut S, today: NaiveDate) -> StorageResult<Self> {
        let stored_date = storage
            .load(LAST_VISIT_DATE_KEY)?
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok());

        if stored_date != Some(today) {
            let counter = Self::new(today);
            storage.save_batch(&counter.entries())?;
            tracing::debug!(
                previous = ?stored_date,
                today = %today,
                "Daily counter reset"
            );
            return Ok(counter);
        }

        let count = storage
            .load(TODAY_PATIENTS_KEY)?
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0);

        Ok(Self { date: today, count })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn state(&self, today: NaiveDate) -> CounterState {
        if self.date == today {
            CounterState::Current
        } else {
            CounterState::Stale
        }
    }

    /// Move a stale counter to `today` with a zero count. Returns true if reset.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.state(today) == CounterState::Current {
            return false;
        }
        self.date = today;
        self.count = 0;
        true
    }

    /// Increment while current. Returns whether the count changed.
    pub fn increment(&mut self, today: NaiveDate) -> bool {
        if self.state(today) != CounterState::Current {
            return false;
        }
        self.count = self.count.saturating_add(1);
        true
    }

    /// Decrement while current and positive. Returns whether the count changed.
    pub fn decrement(&mut self, today: NaiveDate) -> bool {
        if self.state(today) != CounterState::Current || self.count == 0 {
            return false;
        }
        self.count -= 1;
        true
    }

    /// Storage entries for this counter.
    pub fn entries(&self) -> [(&'static str, String); 2] {
        [
            (LAST_VISIT_DATE_KEY, self.date.format(DATE_FORMAT).to_string()),
            (TODAY_PATIENTS_KEY, self.count.to_string()),
        ]
    }
}
