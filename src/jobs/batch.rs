//! Batched writes with per-batch failure isolation

use crate::error::Result;
use crate::models::KeyedRow;
use crate::jobs::types::{BatchFailure, JobKind};
use futures_util::future::BoxFuture;
use tracing::{debug, error};

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub batches: usize,
    pub rows_written: usize,
    pub failures: Vec<BatchFailure>,
}

/// Send `rows` to `write` in slices of at most `batch_size`.
///
/// A failed batch is reported and skipped; the remaining batches still run.
/// `first_batch` numbers batches across several calls within one job.
pub async fn write_in_batches<'a, R, F>(
    job: JobKind,
    rows: &'a [R],
    batch_size: usize,
    first_batch: usize,
    mut write: F,
) -> BatchOutcome
where
    R: KeyedRow,
    F: FnMut(&'a [R]) -> BoxFuture<'a, Result<u64>>,
{
    let mut outcome = BatchOutcome::default();

    for (offset, batch) in rows.chunks(batch_size.max(1)).enumerate() {
        let index = first_batch + offset;
        outcome.batches += 1;

        match write(batch).await {
            Ok(_) => {
                outcome.rows_written += batch.len();
                debug!(job = %job, batch = index, rows = batch.len(), "Committed batch");
            }
            Err(e) => {
                let (Some(first), Some(last)) = (batch.first(), batch.last()) else {
                    continue;
                };
                let failure = BatchFailure {
                    batch: index,
                    first_key: first.key(),
                    last_key: last.key(),
                    rows: batch.len(),
                    cause: e.to_string(),
                };
                error!(
                    job = %job,
                    batch = index,
                    rows = failure.rows,
                    first = %failure.first_key,
                    last = %failure.last_key,
                    error = %e,
                    "Write batch rolled back, continuing with next batch"
                );
                outcome.failures.push(failure);
            }
        }
    }

    outcome
}
