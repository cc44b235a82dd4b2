//! Unit tests for EMA indicator

use dailyta::indicators::trend::{ema, EMA_FAST};

fn create_test_series(count: usize, base_price: f64) -> Vec<Option<f64>> {
    (0..count)
        .map(|i| Some(base_price + i as f64 * 0.5))
        .collect()
}

#[test]
fn test_ema_insufficient_data() {
    let series = create_test_series(10, 100.0);
    let out = ema(&series, EMA_FAST);
    assert_eq!(out.len(), 10);
    assert!(out.iter().all(Option::is_none));
}

#[test]
fn test_ema_first_value_at_span() {
    let series = create_test_series(30, 100.0);
    let out = ema(&series, EMA_FAST);
    assert!(out[..EMA_FAST - 1].iter().all(Option::is_none));
    assert!(out[EMA_FAST - 1..].iter().all(Option::is_some));
}

#[test]
fn test_ema_recursive_definition() {
    let series = create_test_series(40, 100.0);
    let out = ema(&series, 5);
    let alpha = 2.0 / 6.0;

    let mut expected = 100.0;
    for (i, x) in series.iter().enumerate() {
        let x = x.unwrap();
        if i > 0 {
            expected += alpha * (x - expected);
        }
        if i >= 4 {
            assert!((out[i].unwrap() - expected).abs() < 1e-9, "mismatch at {}", i);
        }
    }
}

#[test]
fn test_ema_constant_series() {
    let series = vec![Some(42.0); 25];
    let out = ema(&series, EMA_FAST);
    assert_eq!(out[24], Some(42.0));
}

#[test]
fn test_ema_missing_input_yields_none_and_keeps_state() {
    let mut series = vec![Some(10.0); 6];
    series[3] = None;
    let out = ema(&series, 2);
    assert_eq!(out[3], None);
    assert_eq!(out[4], Some(10.0));
}

#[test]
fn test_ema_empty_and_zero_span() {
    assert!(ema(&[], 20).is_empty());
    assert_eq!(ema(&[Some(1.0)], 0), vec![None]);
}
