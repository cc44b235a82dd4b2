//! Series indicators and per-symbol indicator computation.
//!
//! Every function consumes one full per-symbol history in ascending date
//! order and returns an output of the same length, aligned by position.

pub mod compute;
pub mod momentum;
pub mod trend;
pub mod volume;

pub use compute::{close_observations, compute_indicator_rows, normalize_history};
pub use momentum::{macd, macd_default, rsi, MacdSeries};
pub use trend::{classify, ema};
pub use volume::volume_avg;
