use super::indicators::StoredIndicatorRow;
use super::KeyedRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Signal category assigned to a symbol for one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalType {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "BUY-WATCH")]
    BuyWatch,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "SELL-WATCH")]
    SellWatch,
    #[serde(rename = "SIDEWAY")]
    Sideway,
    #[serde(rename = "HOLD")]
    Hold,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Buy => "BUY",
            SignalType::BuyWatch => "BUY-WATCH",
            SignalType::Sell => "SELL",
            SignalType::SellWatch => "SELL-WATCH",
            SignalType::Sideway => "SIDEWAY",
            SignalType::Hold => "HOLD",
        }
    }

    /// Downstream ordering rank: 3 is highest conviction, HOLD is 0.
    pub fn priority(&self) -> i32 {
        match self {
            SignalType::Buy | SignalType::Sell => 3,
            SignalType::BuyWatch | SignalType::SellWatch => 2,
            SignalType::Sideway => 1,
            SignalType::Hold => 0,
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(SignalType::Buy),
            "BUY-WATCH" => Ok(SignalType::BuyWatch),
            "SELL" => Ok(SignalType::Sell),
            "SELL-WATCH" => Ok(SignalType::SellWatch),
            "SIDEWAY" => Ok(SignalType::Sideway),
            "HOLD" => Ok(SignalType::Hold),
            other => Err(format!("unknown signal type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub symbol: String,
    pub trade_date: NaiveDate,
    pub signal_type: SignalType,
    pub priority: i32,
    pub reason: String,
}

impl KeyedRow for SignalRow {
    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn trade_date(&self) -> NaiveDate {
        self.trade_date
    }
}

/// Signal as it currently sits in the store. Only `signal_type` takes part in
/// change detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSignal {
    pub symbol: String,
    pub trade_date: NaiveDate,
    pub signal_type: Option<String>,
    pub priority: Option<i32>,
    pub reason: Option<String>,
}

impl From<&SignalRow> for StoredSignal {
    fn from(row: &SignalRow) -> Self {
        Self {
            symbol: row.symbol.clone(),
            trade_date: row.trade_date,
            signal_type: Some(row.signal_type.as_str().to_string()),
            priority: Some(row.priority),
            reason: Some(row.reason.clone()),
        }
    }
}

/// Typed per-day view of the indicator fields the signal rules read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub trade_date: NaiveDate,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
}

impl IndicatorSnapshot {
    pub fn new(trade_date: NaiveDate) -> Self {
        Self {
            trade_date,
            ema20: None,
            ema50: None,
            rsi14: None,
            macd: None,
            macd_signal: None,
        }
    }

    pub fn with_ema(mut self, ema20: f64, ema50: f64) -> Self {
        self.ema20 = Some(ema20);
        self.ema50 = Some(ema50);
        self
    }

    pub fn with_rsi(mut self, rsi14: f64) -> Self {
        self.rsi14 = Some(rsi14);
        self
    }

    pub fn with_macd(mut self, macd: f64, macd_signal: f64) -> Self {
        self.macd = Some(macd);
        self.macd_signal = Some(macd_signal);
        self
    }
}

impl From<&StoredIndicatorRow> for IndicatorSnapshot {
    fn from(row: &StoredIndicatorRow) -> Self {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        Self {
            trade_date: row.trade_date,
            ema20: finite(row.ema20),
            ema50: finite(row.ema50),
            rsi14: finite(row.rsi14),
            macd: finite(row.macd),
            macd_signal: finite(row.macd_signal),
        }
    }
}
