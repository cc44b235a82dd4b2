//! Persistence gateway.
//!
//! The jobs only see these traits. `PostgresDatabase` is the production
//! implementation; `MemoryStore` backs tests and dry runs.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresDatabase;

use crate::error::Result;
use crate::models::{IndicatorRow, PriceBar, SignalRow, StoredIndicatorRow, StoredSignal};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Universe of symbols to recompute.
#[async_trait]
pub trait SymbolRegistry: Send + Sync {
    async fn active_symbols(&self) -> Result<Vec<String>>;
}

/// Daily price history feed.
#[async_trait]
pub trait PriceHistory: Send + Sync {
    /// Bars for `symbols` on or after `start`, ordered by (symbol, trade_date).
    async fn load_prices(&self, symbols: &[String], start: NaiveDate) -> Result<Vec<PriceBar>>;
}

#[async_trait]
pub trait IndicatorStore: Send + Sync {
    /// Stored rows on or after `start`, optionally restricted to `symbols`,
    /// ordered by (symbol, trade_date).
    async fn load_indicators(
        &self,
        symbols: Option<&[String]>,
        start: NaiveDate,
    ) -> Result<Vec<StoredIndicatorRow>>;

    /// Upsert one batch atomically: either every row commits or none does.
    async fn upsert_indicators(&self, batch: &[IndicatorRow]) -> Result<u64>;
}

#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn load_signals(&self, start: NaiveDate) -> Result<Vec<StoredSignal>>;

    /// Upsert one batch atomically: either every row commits or none does.
    async fn upsert_signals(&self, batch: &[SignalRow]) -> Result<u64>;
}

/// Everything a pipeline run needs from storage.
pub trait Database: SymbolRegistry + PriceHistory + IndicatorStore + SignalStore {}

impl<T> Database for T where T: SymbolRegistry + PriceHistory + IndicatorStore + SignalStore {}
