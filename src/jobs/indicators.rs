//! Indicator recomputation job.
//!
//! For every active symbol: load the price window, recompute the full
//! indicator series, diff each day against the stored row and write back only
//! what changed.

use crate::config::IndicatorJobConfig;
use crate::db::Database;
use crate::diff::{indicator_row_changed, NumericTolerance};
use crate::error::Result;
use crate::indicators::{close_observations, compute_indicator_rows, normalize_history};
use crate::jobs::batch::write_in_batches;
use crate::jobs::context::JobContext;
use crate::jobs::types::{JobKind, RunReport};
use crate::models::{IndicatorRow, PriceBar, StoredIndicatorRow};
use chrono::NaiveDate;
use futures_util::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of recomputing one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub skipped: bool,
    pub rows_computed: usize,
    /// Rows that are new or differ from the store, in date order.
    pub changed: Vec<IndicatorRow>,
}

/// Recompute one symbol's window and keep the rows that need writing.
///
/// Symbols with fewer than `min_observations` usable closes are skipped
/// entirely so that no partially seeded rows are emitted.
pub fn recompute_symbol(
    symbol: &str,
    bars: &[PriceBar],
    existing: &HashMap<NaiveDate, StoredIndicatorRow>,
    tolerance: &NumericTolerance,
    min_observations: usize,
) -> SymbolOutcome {
    if close_observations(bars) < min_observations {
        return SymbolOutcome {
            symbol: symbol.to_string(),
            skipped: true,
            rows_computed: 0,
            changed: Vec::new(),
        };
    }

    let rows = compute_indicator_rows(symbol, bars);
    let rows_computed = rows.len();
    let changed = rows
        .into_iter()
        .filter(|row| indicator_row_changed(tolerance, row, existing.get(&row.trade_date)))
        .collect();

    SymbolOutcome {
        symbol: symbol.to_string(),
        skipped: false,
        rows_computed,
        changed,
    }
}

struct SymbolWork {
    symbol: String,
    bars: Vec<PriceBar>,
    existing: HashMap<NaiveDate, StoredIndicatorRow>,
}

pub struct IndicatorJob {
    config: IndicatorJobConfig,
    ctx: Arc<JobContext>,
}

impl IndicatorJob {
    pub fn new(config: IndicatorJobConfig, ctx: Arc<JobContext>) -> Self {
        Self { config, ctx }
    }

    pub fn config(&self) -> &IndicatorJobConfig {
        &self.config
    }

    /// Run over the window resolved against `today`.
    pub async fn run(&self, today: NaiveDate) -> Result<RunReport> {
        let started = Instant::now();
        let start = self.config.start.resolve(today);
        let db = self.ctx.database.as_ref();

        info!(
            start_date = %start,
            mode = %self.config.start.describe(),
            "IndicatorJob: start date {}",
            start
        );

        let mut symbols = db.active_symbols().await?;
        symbols.sort();
        symbols.dedup();

        let mut report = RunReport::new(JobKind::Indicators, start);
        report.symbols_total = symbols.len();

        if symbols.is_empty() {
            warn!("IndicatorJob: no active symbols, nothing to compute");
            report.no_op = true;
            return Ok(report);
        }

        let tolerance = NumericTolerance::new(self.config.epsilon);
        let mut pending: Vec<IndicatorRow> = Vec::new();
        let mut next_batch = 0;
        let mut saw_prices = false;

        for (chunk_index, chunk) in symbols.chunks(self.config.symbol_chunk.max(1)).enumerate() {
            let prices = db.load_prices(chunk, start).await?;
            if prices.is_empty() {
                debug!(chunk = chunk_index, "IndicatorJob: no price rows for chunk");
                report.symbols_skipped += chunk.len();
                continue;
            }
            saw_prices = true;

            let existing = db.load_indicators(Some(chunk), start).await?;
            let work = group_work(prices, existing);
            report.symbols_skipped += chunk.len() - work.len();

            let min_observations = self.config.min_observations;
            let mut outcomes = stream::iter(work.into_iter().map(|w| {
                tokio::task::spawn_blocking(move || {
                    recompute_symbol(&w.symbol, &w.bars, &w.existing, &tolerance, min_observations)
                })
            }))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<std::result::Result<Vec<SymbolOutcome>, _>>()?;

            outcomes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
            for outcome in outcomes {
                if outcome.skipped {
                    debug!(symbol = %outcome.symbol, "IndicatorJob: insufficient history, skipping");
                    report.symbols_skipped += 1;
                    continue;
                }
                report.symbols_processed += 1;
                report.rows_computed += outcome.rows_computed;
                report.rows_changed += outcome.changed.len();
                report.rows_unchanged += outcome.rows_computed - outcome.changed.len();
                pending.extend(outcome.changed);
            }

            info!(
                chunk = chunk_index,
                symbols_done = report.symbols_processed + report.symbols_skipped,
                symbols_total = report.symbols_total,
                pending = pending.len(),
                "IndicatorJob: progress"
            );

            if pending.len() >= self.config.flush_rows {
                self.flush(db, &mut pending, &mut report, &mut next_batch).await;
            }
        }

        if !saw_prices {
            info!("IndicatorJob: no price rows in window");
            report.no_op = true;
            self.record_metrics(&report, started);
            return Ok(report);
        }

        if pending.is_empty() && report.rows_changed == 0 {
            info!("IndicatorJob: no changed rows to write");
        }
        self.flush(db, &mut pending, &mut report, &mut next_batch).await;

        self.record_metrics(&report, started);
        info!(
            symbols = report.symbols_processed,
            skipped = report.symbols_skipped,
            computed = report.rows_computed,
            written = report.rows_written,
            unchanged = report.rows_unchanged,
            failed_batches = report.failed_batches.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "IndicatorJob: done"
        );

        Ok(report)
    }

    async fn flush(
        &self,
        db: &dyn Database,
        pending: &mut Vec<IndicatorRow>,
        report: &mut RunReport,
        next_batch: &mut usize,
    ) {
        if pending.is_empty() {
            return;
        }

        info!(rows = pending.len(), "IndicatorJob: upserting {} rows", pending.len());
        let outcome = write_in_batches(
            JobKind::Indicators,
            pending.as_slice(),
            self.config.write_batch_size,
            *next_batch,
            |batch| db.upsert_indicators(batch),
        )
        .await;

        *next_batch += outcome.batches;
        report.rows_written += outcome.rows_written;
        report.failed_batches.extend(outcome.failures);
        pending.clear();
    }

    fn record_metrics(&self, report: &RunReport, started: Instant) {
        if let Some(metrics) = &self.ctx.metrics {
            metrics.record_run(report, started.elapsed());
        }
    }
}

/// Split a chunk's prices and stored rows into per-symbol work items.
fn group_work(prices: Vec<PriceBar>, existing: Vec<StoredIndicatorRow>) -> Vec<SymbolWork> {
    let mut bars_by_symbol: BTreeMap<String, Vec<PriceBar>> = BTreeMap::new();
    for bar in prices {
        bars_by_symbol.entry(bar.symbol.clone()).or_default().push(bar);
    }

    let mut stored_by_symbol: HashMap<String, HashMap<NaiveDate, StoredIndicatorRow>> =
        HashMap::new();
    for row in existing {
        stored_by_symbol
            .entry(row.symbol.clone())
            .or_default()
            .insert(row.trade_date, row);
    }

    bars_by_symbol
        .into_iter()
        .map(|(symbol, bars)| SymbolWork {
            existing: stored_by_symbol.remove(&symbol).unwrap_or_default(),
            bars: normalize_history(bars),
            symbol,
        })
        .collect()
}
