//! In-process store for tests and dry runs

use crate::db::{IndicatorStore, PriceHistory, SignalStore, SymbolRegistry};
use crate::error::{Error, Result};
use crate::common::math::round_to;
use crate::models::indicators::NUMERIC_COLUMNS;
use crate::models::{IndicatorRow, PriceBar, SignalRow, StoredIndicatorRow, StoredSignal};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tokio::sync::RwLock;

type Key = (String, NaiveDate);

#[derive(Default)]
struct MemoryState {
    symbols: BTreeSet<String>,
    prices: BTreeMap<Key, PriceBar>,
    indicators: BTreeMap<Key, StoredIndicatorRow>,
    signals: BTreeMap<Key, StoredSignal>,
    indicator_batches: usize,
    signal_batches: usize,
    indicator_rows_written: usize,
    signal_rows_written: usize,
    failing_indicator_batches: HashSet<usize>,
    failing_signal_batches: HashSet<usize>,
    column_scale: bool,
}

/// Keyed tables held in memory with the same upsert semantics as the
/// database. Write batches can be made to fail by their 0-based index.
///
/// Values are kept exactly as written unless `with_column_scale` is set, in
/// which case indicator values go through the decimal scale of their column
/// like a NUMERIC column would store them.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .get_mut()
            .symbols
            .extend(symbols.into_iter().map(Into::into));
        self
    }

    pub fn with_column_scale(mut self) -> Self {
        self.state.get_mut().column_scale = true;
        self
    }

    pub fn with_prices(mut self, bars: impl IntoIterator<Item = PriceBar>) -> Self {
        let state = self.state.get_mut();
        for bar in bars {
            state.prices.insert((bar.symbol.clone(), bar.trade_date), bar);
        }
        self
    }

    pub fn with_indicators(mut self, rows: impl IntoIterator<Item = StoredIndicatorRow>) -> Self {
        let state = self.state.get_mut();
        for row in rows {
            state.indicators.insert((row.symbol.clone(), row.trade_date), row);
        }
        self
    }

    pub fn with_signals(mut self, rows: impl IntoIterator<Item = StoredSignal>) -> Self {
        let state = self.state.get_mut();
        for row in rows {
            state.signals.insert((row.symbol.clone(), row.trade_date), row);
        }
        self
    }

    pub async fn insert_prices(&self, bars: impl IntoIterator<Item = PriceBar>) {
        let mut state = self.state.write().await;
        for bar in bars {
            state.prices.insert((bar.symbol.clone(), bar.trade_date), bar);
        }
    }

    pub async fn put_indicator(&self, row: StoredIndicatorRow) {
        let mut state = self.state.write().await;
        state.indicators.insert((row.symbol.clone(), row.trade_date), row);
    }

    pub async fn put_signal(&self, row: StoredSignal) {
        let mut state = self.state.write().await;
        state.signals.insert((row.symbol.clone(), row.trade_date), row);
    }

    /// Make the given upcoming indicator write batches fail and roll back.
    pub async fn fail_indicator_batches(&self, indices: impl IntoIterator<Item = usize>) {
        self.state
            .write()
            .await
            .failing_indicator_batches
            .extend(indices);
    }

    pub async fn fail_signal_batches(&self, indices: impl IntoIterator<Item = usize>) {
        self.state
            .write()
            .await
            .failing_signal_batches
            .extend(indices);
    }

    pub async fn indicators(&self) -> Vec<StoredIndicatorRow> {
        self.state.read().await.indicators.values().cloned().collect()
    }

    pub async fn indicator(&self, symbol: &str, trade_date: NaiveDate) -> Option<StoredIndicatorRow> {
        self.state
            .read()
            .await
            .indicators
            .get(&(symbol.to_string(), trade_date))
            .cloned()
    }

    pub async fn signals(&self) -> Vec<StoredSignal> {
        self.state.read().await.signals.values().cloned().collect()
    }

    pub async fn signal(&self, symbol: &str, trade_date: NaiveDate) -> Option<StoredSignal> {
        self.state
            .read()
            .await
            .signals
            .get(&(symbol.to_string(), trade_date))
            .cloned()
    }

    /// Total indicator rows committed over the store's lifetime.
    pub async fn indicator_rows_written(&self) -> usize {
        self.state.read().await.indicator_rows_written
    }

    pub async fn signal_rows_written(&self) -> usize {
        self.state.read().await.signal_rows_written
    }
}

#[async_trait]
impl SymbolRegistry for MemoryStore {
    async fn active_symbols(&self) -> Result<Vec<String>> {
        Ok(self.state.read().await.symbols.iter().cloned().collect())
    }
}

#[async_trait]
impl PriceHistory for MemoryStore {
    async fn load_prices(&self, symbols: &[String], start: NaiveDate) -> Result<Vec<PriceBar>> {
        let wanted: HashSet<&str> = symbols.iter().map(String::as_str).collect();
        let state = self.state.read().await;
        Ok(state
            .prices
            .iter()
            .filter(|((symbol, date), _)| *date >= start && wanted.contains(symbol.as_str()))
            .map(|(_, bar)| bar.clone())
            .collect())
    }
}

#[async_trait]
impl IndicatorStore for MemoryStore {
    async fn load_indicators(
        &self,
        symbols: Option<&[String]>,
        start: NaiveDate,
    ) -> Result<Vec<StoredIndicatorRow>> {
        let wanted: Option<HashSet<&str>> =
            symbols.map(|s| s.iter().map(String::as_str).collect());
        let state = self.state.read().await;
        Ok(state
            .indicators
            .iter()
            .filter(|((symbol, date), _)| {
                *date >= start
                    && wanted
                        .as_ref()
                        .map_or(true, |w| w.contains(symbol.as_str()))
            })
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn upsert_indicators(&self, batch: &[IndicatorRow]) -> Result<u64> {
        let mut state = self.state.write().await;
        let index = state.indicator_batches;
        state.indicator_batches += 1;

        if state.failing_indicator_batches.contains(&index) {
            return Err(Error::Store(format!("injected failure on indicator batch {}", index)));
        }

        let column_scale = state.column_scale;
        for row in batch {
            let mut stored = StoredIndicatorRow::from(row);
            if column_scale {
                store_at_column_scale(&mut stored);
            }
            state
                .indicators
                .insert((row.symbol.clone(), row.trade_date), stored);
        }
        state.indicator_rows_written += batch.len();
        Ok(batch.len() as u64)
    }
}

#[async_trait]
impl SignalStore for MemoryStore {
    async fn load_signals(&self, start: NaiveDate) -> Result<Vec<StoredSignal>> {
        let state = self.state.read().await;
        Ok(state
            .signals
            .iter()
            .filter(|((_, date), _)| *date >= start)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn upsert_signals(&self, batch: &[SignalRow]) -> Result<u64> {
        let mut state = self.state.write().await;
        let index = state.signal_batches;
        state.signal_batches += 1;

        if state.failing_signal_batches.contains(&index) {
            return Err(Error::Store(format!("injected failure on signal batch {}", index)));
        }

        for row in batch {
            state
                .signals
                .insert((row.symbol.clone(), row.trade_date), StoredSignal::from(row));
        }
        state.signal_rows_written += batch.len();
        Ok(batch.len() as u64)
    }
}

/// What a float8 value cast into NUMERIC(p,s) reads back as: rounded half
/// away from zero at the column scale.
fn store_at_column_scale(row: &mut StoredIndicatorRow) {
    let fields = [
        &mut row.ema20,
        &mut row.ema50,
        &mut row.ema200,
        &mut row.rsi14,
        &mut row.macd,
        &mut row.macd_signal,
        &mut row.macd_hist,
        &mut row.volume_avg20,
    ];
    for (field, (_, scale)) in fields.into_iter().zip(NUMERIC_COLUMNS) {
        *field = field.map(|v| round_to(v, scale));
    }
}
