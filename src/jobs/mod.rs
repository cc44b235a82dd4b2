//! Daily batch jobs: indicator recomputation, then signal classification.

pub mod batch;
pub mod context;
pub mod indicators;
pub mod signals;
pub mod types;

pub use context::JobContext;
pub use indicators::{recompute_symbol, IndicatorJob, SymbolOutcome};
pub use signals::SignalJob;
pub use types::{BatchFailure, JobKind, RunReport};
