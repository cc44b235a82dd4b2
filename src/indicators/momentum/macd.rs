//! MACD (Moving Average Convergence Divergence) indicator

use crate::indicators::trend::ema;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Aligned MACD line, signal line and histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal) of MACD
/// Histogram = MACD - Signal
///
/// The signal EMA starts at the first defined MACD value, so it needs
/// `slow + signal - 1` closes before it is reported.
pub fn macd(close: &[Option<f64>], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = ema(close, fast);
    let slow_ema = ema(close, slow);

    let macd_line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let signal_line = ema(&macd_line, signal);

    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    MacdSeries {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}

/// MACD with default periods (12, 26, 9)
pub fn macd_default(close: &[Option<f64>]) -> MacdSeries {
    macd(close, MACD_FAST, MACD_SLOW, MACD_SIGNAL)
}
