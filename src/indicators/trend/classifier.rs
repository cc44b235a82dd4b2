//! Trend label for a single day's indicator snapshot

use crate::models::indicators::TrendStatus;

/// Maximum relative distance of close from EMA50 for a sideways market.
pub const SIDEWAY_BAND: f64 = 0.02;
pub const RSI_NEUTRAL_LOW: f64 = 40.0;
pub const RSI_NEUTRAL_HIGH: f64 = 60.0;

/// Classify a day. Rules are checked in order and the first match wins:
///
/// 1. any of close/ema20/ema50/ema200 missing: no label
/// 2. uptrend: close > ema200 and ema20 > ema50
/// 3. downtrend: close < ema200 and ema20 < ema50
/// 4. sideway: close within 2% of ema50 and 40 <= rsi14 <= 60
pub fn classify(
    close: Option<f64>,
    ema20: Option<f64>,
    ema50: Option<f64>,
    ema200: Option<f64>,
    rsi14: Option<f64>,
) -> Option<TrendStatus> {
    let (close, ema20, ema50, ema200) = (close?, ema20?, ema50?, ema200?);

    if close > ema200 && ema20 > ema50 {
        return Some(TrendStatus::Uptrend);
    }
    if close < ema200 && ema20 < ema50 {
        return Some(TrendStatus::Downtrend);
    }

    let rsi = rsi14?;
    if ema50 != 0.0
        && (close - ema50).abs() / ema50.abs() <= SIDEWAY_BAND
        && (RSI_NEUTRAL_LOW..=RSI_NEUTRAL_HIGH).contains(&rsi)
    {
        return Some(TrendStatus::Sideway);
    }

    None
}
