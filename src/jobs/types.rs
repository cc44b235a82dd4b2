//! Job reports

use crate::models::RowKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Indicators,
    Signals,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Indicators => "indicators",
            JobKind::Signals => "signals",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A write batch that was rolled back. The rows it carried were not written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub batch: usize,
    pub first_key: RowKey,
    pub last_key: RowKey,
    pub rows: usize,
    pub cause: String,
}

/// Outcome of one job run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub job: JobKind,
    pub start_date: NaiveDate,
    /// Nothing to do: empty universe or empty input window.
    pub no_op: bool,
    pub symbols_total: usize,
    pub symbols_processed: usize,
    pub symbols_skipped: usize,
    pub rows_computed: usize,
    /// Rows that differed from the store and were sent for writing.
    pub rows_changed: usize,
    pub rows_unchanged: usize,
    /// Rows in batches that committed.
    pub rows_written: usize,
    pub failed_batches: Vec<BatchFailure>,
}

impl RunReport {
    pub fn new(job: JobKind, start_date: NaiveDate) -> Self {
        Self {
            job,
            start_date,
            no_op: false,
            symbols_total: 0,
            symbols_processed: 0,
            symbols_skipped: 0,
            rows_computed: 0,
            rows_changed: 0,
            rows_unchanged: 0,
            rows_written: 0,
            failed_batches: Vec::new(),
        }
    }

    pub fn no_op(job: JobKind, start_date: NaiveDate) -> Self {
        Self {
            no_op: true,
            ..Self::new(job, start_date)
        }
    }

    /// Every changed row was committed.
    pub fn is_complete(&self) -> bool {
        self.failed_batches.is_empty()
    }
}
