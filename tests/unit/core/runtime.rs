//! Unit tests for pipeline runtime helpers

use chrono::NaiveDate;
use dailyta::core::runtime::{is_trading_day, Stage};

#[test]
fn test_stage_parse() {
    assert_eq!("all".parse::<Stage>().unwrap(), Stage::All);
    assert_eq!("indicators".parse::<Stage>().unwrap(), Stage::Indicators);
    assert_eq!("signals".parse::<Stage>().unwrap(), Stage::Signals);
    assert!("backfill".parse::<Stage>().is_err());
}

#[test]
fn test_weekends_are_not_trading_days() {
    // 2024-06-08 is a Saturday
    let saturday = NaiveDate::from_ymd_opt(2024, 6, 8).unwrap();
    let sunday = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
    let monday = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    assert!(!is_trading_day(saturday));
    assert!(!is_trading_day(sunday));
    assert!(is_trading_day(monday));
}
