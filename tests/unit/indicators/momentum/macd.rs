//! Unit tests for MACD indicator

use dailyta::indicators::momentum::{macd, macd_default, MACD_SIGNAL, MACD_SLOW};

fn create_test_series(count: usize) -> Vec<Option<f64>> {
    (0..count)
        .map(|i| Some(100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1))
        .collect()
}

#[test]
fn test_macd_lengths_align() {
    let series = create_test_series(60);
    let out = macd_default(&series);
    assert_eq!(out.macd.len(), 60);
    assert_eq!(out.signal.len(), 60);
    assert_eq!(out.histogram.len(), 60);
}

#[test]
fn test_macd_warmup() {
    let series = create_test_series(60);
    let out = macd_default(&series);
    assert!(out.macd[MACD_SLOW - 2].is_none());
    assert!(out.macd[MACD_SLOW - 1].is_some());

    let first_signal = MACD_SLOW + MACD_SIGNAL - 2;
    assert!(out.signal[first_signal - 1].is_none());
    assert!(out.signal[first_signal].is_some());
}

#[test]
fn test_macd_histogram_is_difference() {
    let series = create_test_series(80);
    let out = macd_default(&series);
    for i in 0..80 {
        if let (Some(m), Some(s), Some(h)) = (out.macd[i], out.signal[i], out.histogram[i]) {
            assert!((h - (m - s)).abs() < 1e-12);
        }
    }
}

#[test]
fn test_macd_constant_series_is_flat() {
    let series = vec![Some(100.0); 40];
    let out = macd_default(&series);
    assert_eq!(out.macd[39], Some(0.0));
    assert_eq!(out.signal[39], Some(0.0));
    assert_eq!(out.histogram[39], Some(0.0));
}

#[test]
fn test_macd_short_periods() {
    let series = create_test_series(10);
    let out = macd(&series, 3, 5, 2);
    assert!(out.macd[3].is_none());
    assert!(out.macd[4].is_some());
    assert!(out.signal[4].is_none());
    assert!(out.signal[5].is_some());
}
