use super::KeyedRow;
use crate::common::math::round_to;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Daily price bar as ingested by the price feed. Read-only for this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub symbol: String,
    pub trade_date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl PriceBar {
    pub fn new(symbol: impl Into<String>, trade_date: NaiveDate, close: f64, volume: f64) -> Self {
        Self {
            symbol: symbol.into(),
            trade_date,
            open: Some(close),
            high: Some(close),
            low: Some(close),
            close: Some(close),
            volume: Some(volume),
        }
    }

    pub fn with_ohlc(mut self, open: f64, high: f64, low: f64) -> Self {
        self.open = Some(open);
        self.high = Some(high);
        self.low = Some(low);
        self
    }
}

/// Trend label derived from a single day's indicator snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    Uptrend,
    Downtrend,
    Sideway,
}

impl TrendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendStatus::Uptrend => "uptrend",
            TrendStatus::Downtrend => "downtrend",
            TrendStatus::Sideway => "sideway",
        }
    }
}

impl fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uptrend" => Ok(TrendStatus::Uptrend),
            "downtrend" => Ok(TrendStatus::Downtrend),
            "sideway" => Ok(TrendStatus::Sideway),
            other => Err(format!("unknown trend status '{}'", other)),
        }
    }
}

/// Indicator value columns with the decimal scale the store keeps for each,
/// in `numeric_fields` order. The table DDL is generated from this list.
pub const NUMERIC_COLUMNS: [(&str, u32); 8] = [
    ("ema20", 6),
    ("ema50", 6),
    ("ema200", 6),
    ("rsi14", 6),
    ("macd", 6),
    ("macd_signal", 6),
    ("macd_hist", 6),
    ("volume_avg20", 2),
];

/// Freshly computed indicator values for one symbol and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub symbol: String,
    pub trade_date: NaiveDate,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub ema200: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub volume_avg20: Option<f64>,
    pub trend_status: Option<TrendStatus>,
}

impl IndicatorRow {
    /// Numeric fields in storage column order.
    pub fn numeric_fields(&self) -> [Option<f64>; 8] {
        [
            self.ema20,
            self.ema50,
            self.ema200,
            self.rsi14,
            self.macd,
            self.macd_signal,
            self.macd_hist,
            self.volume_avg20,
        ]
    }

    fn numeric_fields_mut(&mut self) -> [&mut Option<f64>; 8] {
        [
            &mut self.ema20,
            &mut self.ema50,
            &mut self.ema200,
            &mut self.rsi14,
            &mut self.macd,
            &mut self.macd_signal,
            &mut self.macd_hist,
            &mut self.volume_avg20,
        ]
    }

    /// Round every value to its column scale, so the row compares equal to
    /// what the store hands back after writing it.
    pub fn round_to_storage(mut self) -> Self {
        for (field, (_, scale)) in self.numeric_fields_mut().into_iter().zip(NUMERIC_COLUMNS) {
            *field = field.map(|v| round_to(v, scale));
        }
        self
    }
}

impl KeyedRow for IndicatorRow {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn trade_date(&self) -> NaiveDate {
        self.trade_date
    }
}

/// Indicator row as it currently sits in the store.
///
/// The trend label is kept as raw text so that values written by other tools
/// compare textually instead of failing to load. Numeric values that could
/// not be decoded are carried as NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredIndicatorRow {
    pub symbol: String,
    pub trade_date: NaiveDate,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub ema200: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub volume_avg20: Option<f64>,
    pub trend_status: Option<String>,
}

impl StoredIndicatorRow {
    pub fn numeric_fields(&self) -> [Option<f64>; 8] {
        [
            self.ema20,
            self.ema50,
            self.ema200,
            self.rsi14,
            self.macd,
            self.macd_signal,
            self.macd_hist,
            self.volume_avg20,
        ]
    }
}

impl From<&IndicatorRow> for StoredIndicatorRow {
    fn from(row: &IndicatorRow) -> Self {
        Self {
            symbol: row.symbol.clone(),
            trade_date: row.trade_date,
            ema20: row.ema20,
            ema50: row.ema50,
            ema200: row.ema200,
            rsi14: row.rsi14,
            macd: row.macd,
            macd_signal: row.macd_signal,
            macd_hist: row.macd_hist,
            volume_avg20: row.volume_avg20,
            trend_status: row.trend_status.map(|t| t.as_str().to_string()),
        }
    }
}

impl KeyedRow for StoredIndicatorRow {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn trade_date(&self) -> NaiveDate {
        self.trade_date
    }
}

/// `(symbol, trade_date)` primary key, used in reports and logs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey {
    pub symbol: String,
    pub trade_date: NaiveDate,
}

impl RowKey {
    pub fn new(symbol: &str, trade_date: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_string(),
            trade_date,
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.symbol, self.trade_date)
    }
}
