//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod signal;

pub use indicators::{IndicatorRow, PriceBar, RowKey, StoredIndicatorRow, TrendStatus};
pub use signal::{IndicatorSnapshot, SignalRow, SignalType, StoredSignal};

use chrono::NaiveDate;

/// Rows addressed by the `(symbol, trade_date)` primary key.
pub trait KeyedRow {
    fn symbol(&self) -> &str;
    fn trade_date(&self) -> NaiveDate;

    fn key(&self) -> RowKey {
        RowKey::new(self.symbol(), self.trade_date())
    }
}
