//! dailyta worker
//!
//! Recomputes daily indicators and signals against PostgreSQL.
//!
//! ```text
//! worker [all|indicators|signals] [--start-date YYYY-MM-DD] [--daemon] [--metrics] [--json]
//! ```
//!
//! Without `--daemon` the selected stages run once for today and the process
//! exits. With `--daemon` the full pipeline runs on `PIPELINE_CRON` until
//! Ctrl-C.

use chrono::Local;
use dailyta::config::{self, PipelineConfig, StartDate};
use dailyta::core::runtime::{PipelineReport, PipelineRuntime, Stage};
use dailyta::core::scheduler::JobScheduler;
use dailyta::db::PostgresDatabase;
use dailyta::jobs::context::JobContext;
use dailyta::logging;
use dailyta::metrics::Metrics;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

struct Args {
    stage: Stage,
    start_date: Option<String>,
    daemon: bool,
    metrics: bool,
    json: bool,
}

fn parse_args() -> Result<Args, Box<dyn std::error::Error>> {
    let mut args = Args {
        stage: Stage::All,
        start_date: None,
        daemon: false,
        metrics: false,
        json: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--start-date" => {
                args.start_date = Some(iter.next().ok_or("--start-date requires a value")?);
            }
            "--daemon" => args.daemon = true,
            "--metrics" => args.metrics = true,
            "--json" => args.json = true,
            other if !other.starts_with("--") => args.stage = other.parse()?,
            other => return Err(format!("unknown option '{}'", other).into()),
        }
    }

    Ok(args)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let args = parse_args()?;
    let mut pipeline_config = PipelineConfig::from_env()?;
    if let Some(raw) = &args.start_date {
        pipeline_config.indicators.start = StartDate::Explicit(config::parse_date(raw)?);
    }

    info!("Starting dailyta worker");
    info!(environment = %config::get_environment(), "Environment");
    info!(
        stage = ?args.stage,
        start = %pipeline_config.indicators.start.describe(),
        concurrency = pipeline_config.indicators.concurrency,
        "Worker configuration"
    );

    let metrics = Arc::new(Metrics::new()?);

    info!("Connecting to PostgreSQL...");
    let database = Arc::new(PostgresDatabase::connect(&pipeline_config.database).await?);
    info!("PostgreSQL connected");

    let ctx = Arc::new(JobContext::new(database, Some(metrics.clone())));
    let runtime = Arc::new(PipelineRuntime::new(&pipeline_config, ctx));

    if args.daemon {
        if args.stage != Stage::All {
            warn!("Daemon mode always runs the full pipeline; ignoring stage selection");
        }

        let scheduler = JobScheduler::new(runtime, &pipeline_config.schedule.cron)?;
        scheduler.start().await?;
        if let Some(next) = scheduler.next_run() {
            info!(next = %next, "First scheduled run");
        }

        info!("Worker started, waiting for shutdown signal...");
        signal::ctrl_c().await?;
        info!("Shutting down worker...");
        scheduler.stop().await;
    } else {
        let today = Local::now().date_naive();
        let report = runtime.run_once(args.stage, today).await?;
        print_report(&report, args.json)?;
    }

    if args.metrics {
        println!("{}", metrics.render()?);
    }

    info!("Worker stopped");
    Ok(())
}

fn print_report(report: &PipelineReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for run in [&report.indicators, &report.signals].into_iter().flatten() {
        if run.no_op {
            println!("{}: nothing to do (window from {})", run.job, run.start_date);
            continue;
        }
        println!(
            "{}: {} symbols ({} skipped), {} rows computed, {} written, {} unchanged, {} failed batches",
            run.job,
            run.symbols_processed,
            run.symbols_skipped,
            run.rows_computed,
            run.rows_written,
            run.rows_unchanged,
            run.failed_batches.len()
        );
        for failure in &run.failed_batches {
            println!(
                "  batch {} [{} .. {}] ({} rows): {}",
                failure.batch, failure.first_key, failure.last_key, failure.rows, failure.cause
            );
        }
    }

    Ok(())
}
