//! Volume indicators

use crate::common::math::sma;

pub const DEFAULT_VOLUME_WINDOW: usize = 20;

/// Simple moving average of volume over a trailing window of positions.
///
/// Defined only when all `window` positions ending at `i` carry a value;
/// there are no partial averages.
pub fn volume_avg(volume: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; volume.len()];
    }

    (0..volume.len())
        .map(|i| {
            let start = (i + 1).checked_sub(window)?;
            let values = volume[start..=i]
                .iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect::<Option<Vec<f64>>>()?;
            sma(&values)
        })
        .collect()
}
