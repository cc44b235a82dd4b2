//! Signal job.
//!
//! Classifies every day of the recent indicator window per symbol and writes a
//! signal row only where the signal type differs from what is stored.

use crate::config::SignalJobConfig;
use crate::diff::signal_changed;
use crate::error::Result;
use crate::jobs::batch::write_in_batches;
use crate::jobs::context::JobContext;
use crate::jobs::types::{JobKind, RunReport};
use crate::models::{IndicatorSnapshot, SignalRow};
use crate::signals::SignalEngine;
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct SignalJob {
    config: SignalJobConfig,
    ctx: Arc<JobContext>,
}

impl SignalJob {
    pub fn new(config: SignalJobConfig, ctx: Arc<JobContext>) -> Self {
        Self { config, ctx }
    }

    pub fn window_start(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(i64::from(self.config.lookback_days))
    }

    pub async fn run(&self, today: NaiveDate) -> Result<RunReport> {
        let started = Instant::now();
        let start = self.window_start(today);
        let db = self.ctx.database.as_ref();

        let history = db.load_indicators(None, start).await?;
        if history.is_empty() {
            warn!(start_date = %start, "SignalJob: no indicator data found");
            return Ok(RunReport::no_op(JobKind::Signals, start));
        }

        let existing: HashMap<(String, NaiveDate), Option<String>> = db
            .load_signals(start)
            .await?
            .into_iter()
            .map(|s| ((s.symbol, s.trade_date), s.signal_type))
            .collect();

        let mut by_symbol: BTreeMap<String, Vec<IndicatorSnapshot>> = BTreeMap::new();
        for row in &history {
            by_symbol
                .entry(row.symbol.clone())
                .or_default()
                .push(IndicatorSnapshot::from(row));
        }

        let mut report = RunReport::new(JobKind::Signals, start);
        report.symbols_total = by_symbol.len();

        let mut changed: Vec<SignalRow> = Vec::new();
        for (symbol, snapshots) in &by_symbol {
            let signals = SignalEngine::detect_signals(symbol, snapshots);
            if signals.is_empty() {
                debug!(symbol = %symbol, "SignalJob: no complete indicator days, skipping");
                report.symbols_skipped += 1;
                continue;
            }

            report.symbols_processed += 1;
            report.rows_computed += signals.len();
            for signal in signals {
                let stored = existing
                    .get(&(signal.symbol.clone(), signal.trade_date))
                    .and_then(|s| s.as_deref());
                if signal_changed(&signal, stored) {
                    changed.push(signal);
                } else {
                    report.rows_unchanged += 1;
                }
            }
        }
        report.rows_changed = changed.len();

        if changed.is_empty() {
            info!("SignalJob: no signal changes to write");
        } else {
            info!(rows = changed.len(), "SignalJob: writing {} updated signals", changed.len());
            let outcome = write_in_batches(
                JobKind::Signals,
                changed.as_slice(),
                self.config.write_batch_size,
                0,
                |batch| db.upsert_signals(batch),
            )
            .await;
            report.rows_written = outcome.rows_written;
            report.failed_batches = outcome.failures;
        }

        if let Some(metrics) = &self.ctx.metrics {
            metrics.record_run(&report, started.elapsed());
        }

        info!(
            symbols = report.symbols_processed,
            computed = report.rows_computed,
            written = report.rows_written,
            unchanged = report.rows_unchanged,
            failed_batches = report.failed_batches.len(),
            "SignalJob: done"
        );

        Ok(report)
    }
}
