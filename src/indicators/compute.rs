//! Full indicator row computation for one symbol's price history

use crate::indicators::momentum::{macd_default, rsi, DEFAULT_RSI_PERIOD};
use crate::indicators::trend::{classify, ema, EMA_FAST, EMA_MEDIUM, EMA_SLOW};
use crate::indicators::volume::{volume_avg, DEFAULT_VOLUME_WINDOW};
use crate::models::indicators::{IndicatorRow, PriceBar};

/// Number of usable closes in a history.
pub fn close_observations(bars: &[PriceBar]) -> usize {
    bars.iter()
        .filter(|b| b.close.is_some_and(|c| c.is_finite()))
        .count()
}

/// Compute one `IndicatorRow` per bar.
///
/// `bars` must belong to a single symbol and be in ascending date order; every
/// recurrence depends on the previous output, so the order is the contract.
///
/// The trend label is classified on full-precision values; the emitted
/// numbers are rounded to their storage scale.
pub fn compute_indicator_rows(symbol: &str, bars: &[PriceBar]) -> Vec<IndicatorRow> {
    debug_assert!(bars.windows(2).all(|w| w[0].trade_date < w[1].trade_date));

    let closes: Vec<Option<f64>> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<Option<f64>> = bars.iter().map(|b| b.volume).collect();

    let ema20 = ema(&closes, EMA_FAST);
    let ema50 = ema(&closes, EMA_MEDIUM);
    let ema200 = ema(&closes, EMA_SLOW);
    let rsi14 = rsi(&closes, DEFAULT_RSI_PERIOD);
    let macd = macd_default(&closes);
    let volume_avg20 = volume_avg(&volumes, DEFAULT_VOLUME_WINDOW);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            symbol: symbol.to_string(),
            trade_date: bar.trade_date,
            ema20: ema20[i],
            ema50: ema50[i],
            ema200: ema200[i],
            rsi14: rsi14[i],
            macd: macd.macd[i],
            macd_signal: macd.signal[i],
            macd_hist: macd.histogram[i],
            volume_avg20: volume_avg20[i],
            trend_status: classify(bar.close, ema20[i], ema50[i], ema200[i], rsi14[i]),
        }
        .round_to_storage())
        .collect()
}

/// Sort a symbol's bars by date and keep one bar per day (the last one seen).
pub fn normalize_history(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.sort_by_key(|b| b.trade_date);
    bars.reverse();
    bars.dedup_by_key(|b| b.trade_date);
    bars.reverse();
    bars
}
