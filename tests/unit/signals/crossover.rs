//! Unit tests for MACD crossover detection

use chrono::NaiveDate;
use dailyta::models::IndicatorSnapshot;
use dailyta::signals::{detect_crossover, CrossoverType};

fn snapshot(day: u32, macd: f64, signal: f64) -> IndicatorSnapshot {
    IndicatorSnapshot::new(NaiveDate::from_ymd_opt(2024, 2, day).unwrap()).with_macd(macd, signal)
}

#[test]
fn test_bullish_crossover() {
    let prior = snapshot(1, -0.1, 0.05);
    let current = snapshot(2, 0.2, 0.1);
    assert_eq!(detect_crossover(Some(&prior), &current), CrossoverType::Bullish);
}

#[test]
fn test_bearish_crossover() {
    let prior = snapshot(1, 0.2, 0.1);
    let current = snapshot(2, -0.1, 0.05);
    assert_eq!(detect_crossover(Some(&prior), &current), CrossoverType::Bearish);
}

#[test]
fn test_no_crossover_when_staying_above() {
    let prior = snapshot(1, 0.3, 0.1);
    let current = snapshot(2, 0.4, 0.2);
    assert_eq!(detect_crossover(Some(&prior), &current), CrossoverType::None);
}

#[test]
fn test_touching_is_not_a_crossover() {
    let prior = snapshot(1, 0.1, 0.1);
    let current = snapshot(2, 0.3, 0.1);
    assert_eq!(detect_crossover(Some(&prior), &current), CrossoverType::None);
}

#[test]
fn test_no_prior_day() {
    let current = snapshot(2, 0.2, 0.1);
    assert_eq!(detect_crossover(None, &current), CrossoverType::None);
}

#[test]
fn test_missing_prior_macd() {
    let prior = IndicatorSnapshot::new(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    let current = snapshot(2, 0.2, 0.1);
    assert_eq!(detect_crossover(Some(&prior), &current), CrossoverType::None);
}
