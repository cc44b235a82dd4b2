//! Job context for dependency injection

use crate::db::Database;
use crate::metrics::Metrics;
use std::sync::Arc;

/// Shared handles passed to every job.
///
/// The database is the only shared resource between symbols; all mutation
/// goes through its batched upsert path.
pub struct JobContext {
    pub database: Arc<dyn Database>,
    pub metrics: Option<Arc<Metrics>>,
}

impl JobContext {
    pub fn new(database: Arc<dyn Database>, metrics: Option<Arc<Metrics>>) -> Self {
        Self { database, metrics }
    }
}
