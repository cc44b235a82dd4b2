//! dailyta - incremental daily indicator and signal engine
//!
//! Recomputes per-symbol technical indicators from daily price bars, writes
//! back only the rows that changed, then classifies each day into a trading
//! signal from the stored indicator history.

pub mod common;
pub mod config;
pub mod core;
pub mod db;
pub mod diff;
pub mod error;
pub mod indicators;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod signals;

pub use error::{Error, Result};
