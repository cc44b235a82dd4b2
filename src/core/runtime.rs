//! Pipeline runtime: indicator job, then signal job, for one trading day

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::jobs::context::JobContext;
use crate::jobs::indicators::IndicatorJob;
use crate::jobs::signals::SignalJob;
use crate::jobs::types::RunReport;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// Which jobs a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    All,
    Indicators,
    Signals,
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Stage::All),
            "indicators" => Ok(Stage::Indicators),
            "signals" => Ok(Stage::Signals),
            other => Err(Error::Config(format!(
                "unknown stage '{}' (expected all, indicators or signals)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub as_of: NaiveDate,
    pub indicators: Option<RunReport>,
    pub signals: Option<RunReport>,
}

/// Weekends carry no new bars.
pub fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub struct PipelineRuntime {
    indicators: IndicatorJob,
    signals: SignalJob,
}

impl PipelineRuntime {
    pub fn new(config: &PipelineConfig, ctx: Arc<JobContext>) -> Self {
        Self {
            indicators: IndicatorJob::new(config.indicators.clone(), ctx.clone()),
            signals: SignalJob::new(config.signals.clone(), ctx),
        }
    }

    /// Run the selected stages for `as_of`.
    ///
    /// The signal stage runs after the indicator stage even when some
    /// indicator batches were rolled back; it does not run if the indicator
    /// stage itself failed.
    pub async fn run_once(&self, stage: Stage, as_of: NaiveDate) -> Result<PipelineReport> {
        let mut report = PipelineReport {
            as_of,
            indicators: None,
            signals: None,
        };

        if matches!(stage, Stage::All | Stage::Indicators) {
            let indicators = self.indicators.run(as_of).await?;
            if !indicators.is_complete() {
                warn!(
                    failed_batches = indicators.failed_batches.len(),
                    "PipelineRuntime: indicator stage finished with failed batches"
                );
            }
            report.indicators = Some(indicators);
        }

        if matches!(stage, Stage::All | Stage::Signals) {
            report.signals = Some(self.signals.run(as_of).await?);
        }

        Ok(report)
    }

    /// Full run for a trading day; a no-op on weekends.
    pub async fn run_daily(&self, as_of: NaiveDate) -> Result<Option<PipelineReport>> {
        if !is_trading_day(as_of) {
            info!(date = %as_of, "PipelineRuntime: {} is a weekend, skipping", as_of);
            return Ok(None);
        }

        self.run_once(Stage::All, as_of).await.map(Some)
    }
}
