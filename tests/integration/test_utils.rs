//! Shared fixtures for the job integration tests

use chrono::{Duration, NaiveDate};
use dailyta::config::{IndicatorJobConfig, SignalJobConfig, StartDate};
use dailyta::db::MemoryStore;
use dailyta::jobs::context::JobContext;
use dailyta::metrics::Metrics;
use dailyta::models::{PriceBar, StoredIndicatorRow, StoredSignal};
use std::sync::Arc;

pub fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

pub fn day(offset: i64) -> NaiveDate {
    base_date() + Duration::days(offset)
}

/// Daily bars starting at `base_date()`, a gentle uptrend with a wave on top.
pub fn create_test_bars(symbol: &str, count: usize, base_price: f64) -> Vec<PriceBar> {
    (0..count)
        .map(|i| {
            let close = base_price + i as f64 * 0.2 + (i as f64 * 0.5).sin() * 3.0;
            PriceBar::new(symbol, day(i as i64), close, 1_000.0 + i as f64)
                .with_ohlc(close - 0.5, close + 1.0, close - 1.0)
        })
        .collect()
}

pub fn indicator_config() -> IndicatorJobConfig {
    IndicatorJobConfig {
        start: StartDate::Explicit(base_date()),
        concurrency: 2,
        ..IndicatorJobConfig::default()
    }
}

pub fn signal_config() -> SignalJobConfig {
    SignalJobConfig::default()
}

pub fn test_context(store: Arc<MemoryStore>) -> Arc<JobContext> {
    Arc::new(JobContext::new(store, None))
}

#[allow(dead_code)]
pub fn test_context_with_metrics(store: Arc<MemoryStore>) -> (Arc<JobContext>, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new().expect("Should create metrics"));
    (Arc::new(JobContext::new(store, Some(metrics.clone()))), metrics)
}

/// Stored indicator row with every field the signal rules read.
pub fn stored_indicator(
    symbol: &str,
    date: NaiveDate,
    ema20: f64,
    ema50: f64,
    rsi14: f64,
    macd: f64,
    macd_signal: f64,
) -> StoredIndicatorRow {
    StoredIndicatorRow {
        symbol: symbol.to_string(),
        trade_date: date,
        ema20: Some(ema20),
        ema50: Some(ema50),
        ema200: None,
        rsi14: Some(rsi14),
        macd: Some(macd),
        macd_signal: Some(macd_signal),
        macd_hist: Some(macd - macd_signal),
        volume_avg20: None,
        trend_status: None,
    }
}

#[allow(dead_code)]
pub fn stored_signal(symbol: &str, date: NaiveDate, signal_type: &str, reason: &str) -> StoredSignal {
    StoredSignal {
        symbol: symbol.to_string(),
        trade_date: date,
        signal_type: Some(signal_type.to_string()),
        priority: Some(0),
        reason: Some(reason.to_string()),
    }
}
