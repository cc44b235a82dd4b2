//! Runtime configuration.
//!
//! Every engine takes its configuration struct at construction. `Default`
//! carries the documented defaults; `from_env` overlays environment variables
//! (after `.env` has been loaded by the binary).

use crate::error::{Error, Result};
use chrono::{Duration, NaiveDate};
use std::env;
use std::str::FromStr;

pub const DEFAULT_LOOKBACK_DAYS: u32 = 1300;
pub const DEFAULT_WRITE_BATCH_SIZE: usize = 3000;
pub const DEFAULT_FLUSH_ROWS: usize = 20_000;
pub const DEFAULT_MIN_OBSERVATIONS: usize = 30;
pub const DEFAULT_SYMBOL_CHUNK: usize = 200;
pub const DEFAULT_SIGNAL_LOOKBACK_DAYS: u32 = 10;
pub const DEFAULT_SIGNAL_BATCH_SIZE: usize = 2000;
pub const DEFAULT_CRON: &str = "0 30 18 * * Mon-Fri";
/// Used when `RUST_LOG` is unset. Keeps the postgres driver's per-statement
/// logs out of a normal run.
pub const DEFAULT_LOG_FILTER: &str = "info,tokio_postgres=warn";

/// Deployment environment (`APP_ENV`), used to pick the log format.
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

/// Where the indicator window starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDate {
    Explicit(NaiveDate),
    Lookback { days: u32 },
}

impl StartDate {
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match *self {
            StartDate::Explicit(date) => date,
            StartDate::Lookback { days } => today - Duration::days(i64::from(days)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            StartDate::Explicit(_) => "START_DATE".to_string(),
            StartDate::Lookback { days } => format!("LOOKBACK {} days", days),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub connect_retries: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "host=localhost port=5432 dbname=stocks user=postgres password=postgres"
                .to_string(),
            connect_retries: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorJobConfig {
    pub start: StartDate,
    /// Rows per committed write batch.
    pub write_batch_size: usize,
    /// Pending changed rows that trigger a flush to the store.
    pub flush_rows: usize,
    pub epsilon: f64,
    /// Symbols with fewer usable closes in the window are skipped.
    pub min_observations: usize,
    /// Symbols loaded from the store per read round.
    pub symbol_chunk: usize,
    pub concurrency: usize,
}

impl Default for IndicatorJobConfig {
    fn default() -> Self {
        Self {
            start: StartDate::Lookback {
                days: DEFAULT_LOOKBACK_DAYS,
            },
            write_batch_size: DEFAULT_WRITE_BATCH_SIZE,
            flush_rows: DEFAULT_FLUSH_ROWS,
            epsilon: crate::diff::DEFAULT_EPSILON,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            symbol_chunk: DEFAULT_SYMBOL_CHUNK,
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignalJobConfig {
    pub lookback_days: u32,
    pub write_batch_size: usize,
}

impl Default for SignalJobConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_SIGNAL_LOOKBACK_DAYS,
            write_batch_size: DEFAULT_SIGNAL_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Six-field cron expression (sec min hour day month weekday), local time.
    pub cron: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: DEFAULT_CRON.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub database: DatabaseConfig,
    pub indicators: IndicatorJobConfig,
    pub signals: SignalJobConfig,
    pub schedule: ScheduleConfig,
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys fall back to defaults; set but
    /// invalid values are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let url = match get("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "host={} port={} dbname={} user={} password={}",
                get("posql_host").unwrap_or_else(|| "localhost".to_string()),
                get("posql_port").unwrap_or_else(|| "5432".to_string()),
                get("posql_db").unwrap_or_else(|| "stocks".to_string()),
                get("posql_user").unwrap_or_else(|| "postgres".to_string()),
                get("posql_password").unwrap_or_else(|| "postgres".to_string()),
            ),
        };

        let start = match get("START_DATE") {
            Some(raw) => StartDate::Explicit(parse_date(&raw)?),
            None => StartDate::Lookback {
                days: parse_or("LOOKBACK_DAYS", get("LOOKBACK_DAYS"), DEFAULT_LOOKBACK_DAYS)?,
            },
        };

        let config = Self {
            database: DatabaseConfig {
                url,
                connect_retries: parse_or(
                    "DB_CONNECT_RETRIES",
                    get("DB_CONNECT_RETRIES"),
                    defaults.database.connect_retries,
                )?,
            },
            indicators: IndicatorJobConfig {
                start,
                write_batch_size: parse_or(
                    "IND_BATCH_SIZE",
                    get("IND_BATCH_SIZE"),
                    defaults.indicators.write_batch_size,
                )?,
                flush_rows: parse_or(
                    "IND_FLUSH_ROWS",
                    get("IND_FLUSH_ROWS"),
                    defaults.indicators.flush_rows,
                )?,
                epsilon: parse_or("IND_EPS", get("IND_EPS"), defaults.indicators.epsilon)?,
                min_observations: parse_or(
                    "IND_MIN_OBS",
                    get("IND_MIN_OBS"),
                    defaults.indicators.min_observations,
                )?,
                symbol_chunk: parse_or(
                    "IND_SYMBOL_CHUNK",
                    get("IND_SYMBOL_CHUNK"),
                    defaults.indicators.symbol_chunk,
                )?,
                concurrency: parse_or(
                    "WORKER_CONCURRENCY",
                    get("WORKER_CONCURRENCY"),
                    defaults.indicators.concurrency,
                )?,
            },
            signals: SignalJobConfig {
                lookback_days: parse_or(
                    "SIGNAL_LOOKBACK_DAYS",
                    get("SIGNAL_LOOKBACK_DAYS"),
                    defaults.signals.lookback_days,
                )?,
                write_batch_size: parse_or(
                    "SIGNAL_BATCH_SIZE",
                    get("SIGNAL_BATCH_SIZE"),
                    defaults.signals.write_batch_size,
                )?,
            },
            schedule: ScheduleConfig {
                cron: get("PIPELINE_CRON").unwrap_or(defaults.schedule.cron),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("IND_BATCH_SIZE", self.indicators.write_batch_size),
            ("IND_FLUSH_ROWS", self.indicators.flush_rows),
            ("IND_SYMBOL_CHUNK", self.indicators.symbol_chunk),
            ("WORKER_CONCURRENCY", self.indicators.concurrency),
            ("SIGNAL_BATCH_SIZE", self.signals.write_batch_size),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(Error::Config(format!("{} must be > 0", key)));
            }
        }

        if !self.indicators.epsilon.is_finite() || self.indicators.epsilon < 0.0 {
            return Err(Error::Config(format!(
                "IND_EPS must be a non-negative number, got {}",
                self.indicators.epsilon
            )));
        }

        Ok(())
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| Error::Config(format!("invalid date '{}' (expected YYYY-MM-DD): {}", raw, e)))
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("invalid {} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
