//! PostgreSQL persistence for price history, indicators and signals

use crate::config::DatabaseConfig;
use crate::db::{IndicatorStore, PriceHistory, SignalStore, SymbolRegistry};
use crate::error::Result;
use crate::models::indicators::NUMERIC_COLUMNS;
use crate::models::{IndicatorRow, PriceBar, SignalRow, StoredIndicatorRow, StoredSignal};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::NaiveDate;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, warn};

/// PostgreSQL caps bind parameters per statement at u16::MAX.
const MAX_BIND_PARAMS: usize = 65_535;

const INDICATOR_CASTS: [&str; 11] = [
    "::text", "::date", "::float8", "::float8", "::float8", "::float8", "::float8", "::float8",
    "::float8", "::float8", "::text",
];

const SIGNAL_CASTS: [&str; 5] = ["::text", "::date", "::text", "::int4", "::text"];

const INDICATOR_TABLE_HEAD: &str = "
CREATE TABLE IF NOT EXISTS stock_indicator_daily (
    symbol          TEXT NOT NULL,
    trade_date      DATE NOT NULL,
";

const INDICATOR_TABLE_TAIL: &str = "    trend_status    TEXT,
    updated_at      TIMESTAMP DEFAULT now(),
    PRIMARY KEY(symbol, trade_date)
);
CREATE INDEX IF NOT EXISTS ix_stock_indicator_daily_symdate ON stock_indicator_daily(symbol, trade_date);
";

const SIGNAL_TABLE: &str = "
CREATE TABLE IF NOT EXISTS stock_signal (
    symbol          TEXT NOT NULL,
    trade_date      DATE NOT NULL,
    signal_type     TEXT,
    priority        INT,
    reason          TEXT,
    created_at      TIMESTAMP DEFAULT now(),
    PRIMARY KEY(symbol, trade_date)
);
CREATE INDEX IF NOT EXISTS ix_stock_signal_symdate ON stock_signal(symbol, trade_date);
";

const INDICATOR_UPSERT_TAIL: &str = "
ON CONFLICT (symbol, trade_date) DO UPDATE SET
  ema20        = EXCLUDED.ema20,
  ema50        = EXCLUDED.ema50,
  ema200       = EXCLUDED.ema200,
  rsi14        = EXCLUDED.rsi14,
  macd         = EXCLUDED.macd,
  macd_signal  = EXCLUDED.macd_signal,
  macd_hist    = EXCLUDED.macd_hist,
  volume_avg20 = EXCLUDED.volume_avg20,
  trend_status = EXCLUDED.trend_status,
  updated_at   = now()";

const SIGNAL_UPSERT_TAIL: &str = "
ON CONFLICT (symbol, trade_date) DO UPDATE SET
  signal_type = EXCLUDED.signal_type,
  priority    = EXCLUDED.priority,
  reason      = EXCLUDED.reason,
  created_at  = now()";

const INDICATOR_SELECT: &str = "
SELECT symbol, trade_date,
       ema20::float8, ema50::float8, ema200::float8, rsi14::float8,
       macd::float8, macd_signal::float8, macd_hist::float8, volume_avg20::float8,
       trend_status
FROM stock_indicator_daily";

pub struct PostgresDatabase {
    client: Mutex<Client>,
}

impl PostgresDatabase {
    /// Connect (retrying with exponential backoff) and make sure the owned
    /// tables exist.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.url.as_str();
        let (client, connection) = (|| tokio_postgres::connect(url, NoTls))
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(500))
                    .with_max_times(config.connect_retries),
            )
            .notify(|err: &tokio_postgres::Error, delay: Duration| {
                warn!(error = %err, delay_ms = delay.as_millis() as u64, "Database connect failed, retrying");
            })
            .await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "Database connection error");
            }
        });

        let db = Self {
            client: Mutex::new(client),
        };
        db.init_schema().await?;

        Ok(db)
    }

    async fn init_schema(&self) -> Result<()> {
        let client = self.client.lock().await;
        client.batch_execute(&schema_sql()).await?;
        debug!("Schema ready");
        Ok(())
    }
}

#[async_trait]
impl SymbolRegistry for PostgresDatabase {
    async fn active_symbols(&self) -> Result<Vec<String>> {
        let client = self.client.lock().await;
        let rows = client
            .query(
                "SELECT DISTINCT symbol FROM settrade_stocklist WHERE symbol IS NOT NULL ORDER BY symbol",
                &[],
            )
            .await?;

        Ok(rows.iter().map(|r| r.get::<_, String>(0)).collect())
    }
}

#[async_trait]
impl PriceHistory for PostgresDatabase {
    async fn load_prices(&self, symbols: &[String], start: NaiveDate) -> Result<Vec<PriceBar>> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let client = self.client.lock().await;
        let rows = client
            .query(
                "SELECT symbol, date AS trade_date,
                        open::float8, high::float8, low::float8, close::float8, volume::float8
                 FROM stock_price_history
                 WHERE date >= $1::date AND symbol = ANY($2)
                 ORDER BY symbol, trade_date",
                &[&start, &symbols],
            )
            .await?;

        rows.iter()
            .map(|row| -> Result<PriceBar> {
                Ok(PriceBar {
                    symbol: row.try_get(0)?,
                    trade_date: row.try_get(1)?,
                    open: row.try_get(2)?,
                    high: row.try_get(3)?,
                    low: row.try_get(4)?,
                    close: row.try_get(5)?,
                    volume: row.try_get(6)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl IndicatorStore for PostgresDatabase {
    async fn load_indicators(
        &self,
        symbols: Option<&[String]>,
        start: NaiveDate,
    ) -> Result<Vec<StoredIndicatorRow>> {
        let client = self.client.lock().await;
        let rows = match symbols {
            Some(symbols) => {
                let query = format!(
                    "{} WHERE trade_date >= $1::date AND symbol = ANY($2) ORDER BY symbol, trade_date",
                    INDICATOR_SELECT
                );
                client.query(query.as_str(), &[&start, &symbols]).await?
            }
            None => {
                let query = format!(
                    "{} WHERE trade_date >= $1::date ORDER BY symbol, trade_date",
                    INDICATOR_SELECT
                );
                client.query(query.as_str(), &[&start]).await?
            }
        };

        rows.iter().map(stored_indicator_from_row).collect()
    }

    async fn upsert_indicators(&self, batch: &[IndicatorRow]) -> Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut client = self.client.lock().await;
        let tx = client.transaction().await?;
        let mut affected = 0;

        for chunk in batch.chunks(MAX_BIND_PARAMS / INDICATOR_CASTS.len()) {
            let trends: Vec<Option<&str>> = chunk
                .iter()
                .map(|r| r.trend_status.map(|t| t.as_str()))
                .collect();

            let mut params: Vec<&(dyn ToSql + Sync)> =
                Vec::with_capacity(chunk.len() * INDICATOR_CASTS.len());
            for (row, trend) in chunk.iter().zip(&trends) {
                params.push(&row.symbol);
                params.push(&row.trade_date);
                params.push(&row.ema20);
                params.push(&row.ema50);
                params.push(&row.ema200);
                params.push(&row.rsi14);
                params.push(&row.macd);
                params.push(&row.macd_signal);
                params.push(&row.macd_hist);
                params.push(&row.volume_avg20);
                params.push(trend);
            }

            let sql = format!(
                "INSERT INTO stock_indicator_daily
                 (symbol, trade_date, ema20, ema50, ema200, rsi14, macd, macd_signal, macd_hist, volume_avg20, trend_status)
                 VALUES {}{}",
                values_clause(chunk.len(), &INDICATOR_CASTS),
                INDICATOR_UPSERT_TAIL
            );
            affected += tx.execute(sql.as_str(), &params).await?;
        }

        tx.commit().await?;
        Ok(affected)
    }
}

#[async_trait]
impl SignalStore for PostgresDatabase {
    async fn load_signals(&self, start: NaiveDate) -> Result<Vec<StoredSignal>> {
        let client = self.client.lock().await;
        let rows = client
            .query(
                "SELECT symbol, trade_date, signal_type, priority, reason
                 FROM stock_signal
                 WHERE trade_date >= $1::date
                 ORDER BY symbol, trade_date",
                &[&start],
            )
            .await?;

        rows.iter()
            .map(|row| -> Result<StoredSignal> {
                Ok(StoredSignal {
                    symbol: row.try_get(0)?,
                    trade_date: row.try_get(1)?,
                    signal_type: row.try_get(2)?,
                    priority: row.try_get(3)?,
                    reason: row.try_get(4)?,
                })
            })
            .collect()
    }

    async fn upsert_signals(&self, batch: &[SignalRow]) -> Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut client = self.client.lock().await;
        let tx = client.transaction().await?;
        let mut affected = 0;

        for chunk in batch.chunks(MAX_BIND_PARAMS / SIGNAL_CASTS.len()) {
            let types: Vec<&str> = chunk.iter().map(|r| r.signal_type.as_str()).collect();

            let mut params: Vec<&(dyn ToSql + Sync)> =
                Vec::with_capacity(chunk.len() * SIGNAL_CASTS.len());
            for (row, signal_type) in chunk.iter().zip(&types) {
                params.push(&row.symbol);
                params.push(&row.trade_date);
                params.push(signal_type);
                params.push(&row.priority);
                params.push(&row.reason);
            }

            let sql = format!(
                "INSERT INTO stock_signal (symbol, trade_date, signal_type, priority, reason)
                 VALUES {}{}",
                values_clause(chunk.len(), &SIGNAL_CASTS),
                SIGNAL_UPSERT_TAIL
            );
            affected += tx.execute(sql.as_str(), &params).await?;
        }

        tx.commit().await?;
        Ok(affected)
    }
}

/// Undecodable numeric columns come back as NaN so the row compares as
/// changed and gets rewritten.
fn stored_indicator_from_row(row: &Row) -> Result<StoredIndicatorRow> {
    let numeric = |idx: usize| -> Option<f64> {
        row.try_get::<_, Option<f64>>(idx).unwrap_or(Some(f64::NAN))
    };

    Ok(StoredIndicatorRow {
        symbol: row.try_get(0)?,
        trade_date: row.try_get(1)?,
        ema20: numeric(2),
        ema50: numeric(3),
        ema200: numeric(4),
        rsi14: numeric(5),
        macd: numeric(6),
        macd_signal: numeric(7),
        macd_hist: numeric(8),
        volume_avg20: numeric(9),
        trend_status: row.try_get(10).unwrap_or(None),
    })
}

/// DDL for the owned tables. Indicator value columns take their scale from
/// `NUMERIC_COLUMNS`, the same table computed rows are rounded with.
fn schema_sql() -> String {
    let columns: String = NUMERIC_COLUMNS
        .iter()
        .map(|(name, scale)| format!("    {:<16}NUMERIC(18,{}),\n", name, scale))
        .collect();
    format!("{}{}{}{}", INDICATOR_TABLE_HEAD, columns, INDICATOR_TABLE_TAIL, SIGNAL_TABLE)
}

/// `($1::text, $2::date, ...), (...)` for `rows` rows.
fn values_clause(rows: usize, casts: &[&str]) -> String {
    let columns = casts.len();
    (0..rows)
        .map(|r| {
            let placeholders: Vec<String> = casts
                .iter()
                .enumerate()
                .map(|(c, cast)| format!("${}{}", r * columns + c + 1, cast))
                .collect();
            format!("({})", placeholders.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}
