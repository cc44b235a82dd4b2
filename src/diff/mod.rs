//! Change detection for the selective write path.
//!
//! Indicator rows and signal rows are compared with two different policies.
//! Numeric indicator fields are compared within a tolerance; categorical
//! labels are compared exactly. The two are kept as separate types so a
//! tolerance can never be applied to a label.

use crate::models::indicators::{IndicatorRow, StoredIndicatorRow};
use crate::models::signal::SignalRow;

pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Numeric comparison within an absolute tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericTolerance {
    epsilon: f64,
}

impl NumericTolerance {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Both missing, or both finite and within epsilon. A missing value never
    /// equals a present one, and a non-finite stored value never equals
    /// anything so that it gets rewritten.
    pub fn is_equal(&self, new: Option<f64>, old: Option<f64>) -> bool {
        match (new, old) {
            (None, None) => true,
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => (a - b).abs() <= self.epsilon,
            _ => false,
        }
    }
}

impl Default for NumericTolerance {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}

/// Exact comparison of categorical labels. An empty label counts as missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoricalExact;

impl CategoricalExact {
    pub fn is_equal(&self, new: Option<&str>, old: Option<&str>) -> bool {
        fn present(v: Option<&str>) -> Option<&str> {
            v.filter(|s| !s.is_empty())
        }

        present(new) == present(old)
    }
}

/// True when `new` must be written: there is no stored row, a numeric field
/// moved beyond tolerance, or the trend label changed.
pub fn indicator_row_changed(
    tolerance: &NumericTolerance,
    new: &IndicatorRow,
    old: Option<&StoredIndicatorRow>,
) -> bool {
    let Some(old) = old else {
        return true;
    };

    let numeric_changed = new
        .numeric_fields()
        .iter()
        .zip(old.numeric_fields().iter())
        .any(|(a, b)| !tolerance.is_equal(*a, *b));

    numeric_changed
        || !CategoricalExact.is_equal(
            new.trend_status.map(|t| t.as_str()),
            old.trend_status.as_deref(),
        )
}

/// True when the stored signal type for the key differs from the new one.
/// Priority and reason never gate the write.
pub fn signal_changed(new: &SignalRow, old_signal_type: Option<&str>) -> bool {
    !CategoricalExact.is_equal(Some(new.signal_type.as_str()), old_signal_type)
}
