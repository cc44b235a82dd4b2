//! MACD crossover detection between two consecutive days

use crate::models::signal::IndicatorSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverType {
    Bullish,
    Bearish,
    None,
}

/// Compare MACD against its signal line on the prior and current day.
///
/// Bullish: prior macd < prior signal and current macd > current signal.
/// Bearish is the mirror. Any missing value, or no prior day, is `None`.
pub fn detect_crossover(
    prior: Option<&IndicatorSnapshot>,
    current: &IndicatorSnapshot,
) -> CrossoverType {
    let Some(prior) = prior else {
        return CrossoverType::None;
    };

    let (Some(prev_macd), Some(prev_signal), Some(macd), Some(signal)) = (
        prior.macd,
        prior.macd_signal,
        current.macd,
        current.macd_signal,
    ) else {
        return CrossoverType::None;
    };

    if prev_macd < prev_signal && macd > signal {
        CrossoverType::Bullish
    } else if prev_macd > prev_signal && macd < signal {
        CrossoverType::Bearish
    } else {
        CrossoverType::None
    }
}
