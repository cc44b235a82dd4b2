//! EMA (Exponential Moving Average) indicator

use crate::common::math::{ema_alpha, ExpSmoother};

pub const EMA_FAST: usize = 20;
pub const EMA_MEDIUM: usize = 50;
pub const EMA_SLOW: usize = 200;

/// EMA over a nullable, date-ordered series.
///
/// `ema[0] = x[0]`, `ema[i] = ema[i-1] + 2/(span+1) * (x[i] - ema[i-1])`.
/// A value is reported once `span` observations have been seen; earlier
/// positions and positions with a missing input are `None`.
pub fn ema(series: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return vec![None; series.len()];
    }

    let mut smoother = ExpSmoother::new(ema_alpha(span), span);
    series.iter().map(|&x| smoother.update(x)).collect()
}
