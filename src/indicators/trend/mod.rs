//! Trend indicators: EMA, trend classification

pub mod classifier;
pub mod ema;

pub use classifier::*;
pub use ema::*;
