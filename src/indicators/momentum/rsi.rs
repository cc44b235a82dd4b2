//! RSI (Relative Strength Index) indicator

use crate::common::math::{wilder_alpha, ExpSmoother};

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Wilder RSI over a nullable, date-ordered close series.
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = avg_gain / avg_loss
///
/// Gains and losses come from day-over-day deltas (the first position and any
/// position next to a missing close has no delta) and are smoothed
/// independently with alpha = 1/period. Averages are reported once `period`
/// deltas have been seen. A zero average loss saturates at 100; zero gain and
/// zero loss together have no defined ratio and yield `None`.
pub fn rsi(series: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; series.len()];
    }

    let alpha = wilder_alpha(period);
    let mut gains = ExpSmoother::new(alpha, period);
    let mut losses = ExpSmoother::new(alpha, period);

    let mut out = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        let delta = match (i.checked_sub(1).and_then(|p| series[p]), series[i]) {
            (Some(prev), Some(curr)) => Some(curr - prev),
            _ => None,
        };

        let avg_gain = gains.update(delta.map(|d| d.max(0.0)));
        let avg_loss = losses.update(delta.map(|d| (-d).max(0.0)));

        out.push(match (avg_gain, avg_loss) {
            (Some(gain), Some(loss)) => rsi_from_averages(gain, loss),
            _ => None,
        });
    }

    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return None;
        }
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
