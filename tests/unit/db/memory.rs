//! Unit tests for the in-memory store

use chrono::NaiveDate;
use dailyta::db::{IndicatorStore, MemoryStore, PriceHistory, SignalStore, SymbolRegistry};
use dailyta::models::{IndicatorRow, PriceBar, SignalRow, SignalType, TrendStatus};
use tokio_test::{assert_err, assert_ok, block_on};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn create_test_row(symbol: &str, d: u32, ema20: f64) -> IndicatorRow {
    IndicatorRow {
        symbol: symbol.to_string(),
        trade_date: date(d),
        ema20: Some(ema20),
        ema50: None,
        ema200: None,
        rsi14: None,
        macd: None,
        macd_signal: None,
        macd_hist: None,
        volume_avg20: None,
        trend_status: Some(TrendStatus::Sideway),
    }
}

#[test]
fn test_symbols_and_price_window() {
    let store = MemoryStore::new()
        .with_symbols(["BBB", "AAA"])
        .with_prices([
            PriceBar::new("AAA", date(1), 10.0, 100.0),
            PriceBar::new("AAA", date(3), 11.0, 100.0),
            PriceBar::new("BBB", date(3), 20.0, 100.0),
        ]);

    let symbols = assert_ok!(block_on(store.active_symbols()));
    assert_eq!(symbols, vec!["AAA".to_string(), "BBB".to_string()]);

    let bars = assert_ok!(block_on(store.load_prices(&["AAA".to_string()], date(2))));
    assert_eq!(bars.len(), 1);
    assert_eq!(bars[0].trade_date, date(3));
}

#[test]
fn test_indicator_upsert_overwrites_key() {
    let store = MemoryStore::new();

    assert_ok!(block_on(store.upsert_indicators(&[create_test_row("AAA", 1, 1.0)])));
    assert_ok!(block_on(store.upsert_indicators(&[create_test_row("AAA", 1, 2.0)])));

    let stored = block_on(store.indicator("AAA", date(1))).unwrap();
    assert_eq!(stored.ema20, Some(2.0));
    assert_eq!(stored.trend_status.as_deref(), Some("sideway"));
    assert_eq!(block_on(store.indicators()).len(), 1);
    assert_eq!(block_on(store.indicator_rows_written()), 2);
}

#[test]
fn test_load_indicators_filters_symbols_and_dates() {
    let store = MemoryStore::new();
    let rows = [
        create_test_row("AAA", 1, 1.0),
        create_test_row("AAA", 5, 1.0),
        create_test_row("BBB", 5, 1.0),
    ];
    assert_ok!(block_on(store.upsert_indicators(&rows)));

    let all = assert_ok!(block_on(store.load_indicators(None, date(2))));
    assert_eq!(all.len(), 2);

    let only_b = ["BBB".to_string()];
    let b = assert_ok!(block_on(store.load_indicators(Some(&only_b[..]), date(1))));
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].symbol, "BBB");
}

#[test]
fn test_injected_batch_failure_rolls_back() {
    let store = MemoryStore::new();
    block_on(store.fail_signal_batches([0]));

    let signal = SignalRow {
        symbol: "AAA".to_string(),
        trade_date: date(1),
        signal_type: SignalType::Sideway,
        priority: 1,
        reason: "EMA20≈EMA50 & RSI neutral".to_string(),
    };

    assert_err!(block_on(store.upsert_signals(std::slice::from_ref(&signal))));
    assert!(block_on(store.signal("AAA", date(1))).is_none());

    assert_ok!(block_on(store.upsert_signals(std::slice::from_ref(&signal))));
    let stored = assert_ok!(block_on(store.load_signals(date(1))));
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].signal_type.as_deref(), Some("SIDEWAY"));
    assert_eq!(block_on(store.signal_rows_written()), 1);
}
