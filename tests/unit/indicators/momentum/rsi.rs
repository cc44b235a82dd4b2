//! Unit tests for RSI indicator

use dailyta::indicators::momentum::{rsi, DEFAULT_RSI_PERIOD};

fn create_oscillating_series(count: usize) -> Vec<Option<f64>> {
    (0..count)
        .map(|i| {
            let wave = if i % 3 == 0 { -1.5 } else { 1.0 };
            Some(100.0 + i as f64 * 0.2 + wave)
        })
        .collect()
}

#[test]
fn test_rsi_insufficient_data() {
    let series = create_oscillating_series(DEFAULT_RSI_PERIOD);
    assert!(rsi(&series, DEFAULT_RSI_PERIOD).iter().all(Option::is_none));
}

#[test]
fn test_rsi_first_value_after_period_deltas() {
    let series = create_oscillating_series(30);
    let out = rsi(&series, DEFAULT_RSI_PERIOD);
    assert!(out[DEFAULT_RSI_PERIOD - 1].is_none());
    assert!(out[DEFAULT_RSI_PERIOD].is_some());
}

#[test]
fn test_rsi_bounds() {
    let series = create_oscillating_series(100);
    for value in rsi(&series, DEFAULT_RSI_PERIOD).into_iter().flatten() {
        assert!((0.0..=100.0).contains(&value), "rsi out of range: {}", value);
    }
}

#[test]
fn test_rsi_all_gains_is_100() {
    let series: Vec<Option<f64>> = (0..20).map(|i| Some(100.0 + i as f64)).collect();
    let out = rsi(&series, DEFAULT_RSI_PERIOD);
    assert_eq!(out[19], Some(100.0));
}

#[test]
fn test_rsi_flat_series_is_undefined() {
    let series = vec![Some(50.0); 20];
    assert!(rsi(&series, DEFAULT_RSI_PERIOD).iter().all(Option::is_none));
}

#[test]
fn test_rsi_wilder_smoothing() {
    // Period 2: gains 1 then 0, losses 0 then 1, both smoothed to 0.5
    let series = vec![Some(10.0), Some(11.0), Some(10.0)];
    let out = rsi(&series, 2);
    assert_eq!(out[1], None);
    assert!((out[2].unwrap() - 50.0).abs() < 1e-9);
}

#[test]
fn test_rsi_missing_close_breaks_delta() {
    let mut series: Vec<Option<f64>> = (0..20).map(|i| Some(100.0 + i as f64)).collect();
    series[17] = None;
    let out = rsi(&series, DEFAULT_RSI_PERIOD);
    assert_eq!(out[17], None);
    assert_eq!(out[18], None);
    assert_eq!(out[19], Some(100.0));
}
