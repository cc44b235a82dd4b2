//! Scalar recurrence helpers shared by the series indicators.

/// EMA smoothing factor for a span: `2 / (span + 1)`.
pub fn ema_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Wilder smoothing factor for a period: `1 / period`.
pub fn wilder_alpha(period: usize) -> f64 {
    1.0 / period as f64
}

/// One step of the exponential recurrence.
pub fn smooth(value: f64, previous: f64, alpha: f64) -> f64 {
    previous + alpha * (value - previous)
}

/// One EMA step for the given span.
pub fn ema_from_previous(value: f64, previous: f64, span: usize) -> f64 {
    smooth(value, previous, ema_alpha(span))
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Simple mean. `None` for an empty slice.
pub fn sma(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Exponential smoother seeded with its first observation.
///
/// Output is withheld until `min_periods` observations have been folded in.
/// Missing or non-finite inputs leave the state untouched and produce no
/// output for that position.
#[derive(Debug, Clone)]
pub struct ExpSmoother {
    alpha: f64,
    min_periods: usize,
    value: Option<f64>,
    observations: usize,
}

impl ExpSmoother {
    pub fn new(alpha: f64, min_periods: usize) -> Self {
        Self {
            alpha,
            min_periods,
            value: None,
            observations: 0,
        }
    }

    pub fn update(&mut self, input: Option<f64>) -> Option<f64> {
        let x = input.filter(|x| x.is_finite())?;
        let next = match self.value {
            Some(prev) => smooth(x, prev, self.alpha),
            None => x,
        };
        self.value = Some(next);
        self.observations += 1;

        if self.observations >= self.min_periods {
            Some(next)
        } else {
            None
        }
    }

    pub fn observations(&self) -> usize {
        self.observations
    }
}
