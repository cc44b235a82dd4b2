//! Prometheus metrics for indicator and signal runs.

use crate::jobs::types::RunReport;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

pub struct Metrics {
    registry: Registry,
    pub rows_computed_total: IntCounterVec,
    pub rows_written_total: IntCounterVec,
    pub symbols_skipped_total: IntCounterVec,
    pub batches_failed_total: IntCounterVec,
    pub job_duration_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("dailyta".to_string()), None)?;

        let rows_computed_total = IntCounterVec::new(
            Opts::new("rows_computed_total", "Rows recomputed by a job"),
            &["job"],
        )?;
        let rows_written_total = IntCounterVec::new(
            Opts::new("rows_written_total", "Rows committed to the store"),
            &["job"],
        )?;
        let symbols_skipped_total = IntCounterVec::new(
            Opts::new("symbols_skipped_total", "Symbols skipped for insufficient history"),
            &["job"],
        )?;
        let batches_failed_total = IntCounterVec::new(
            Opts::new("batches_failed_total", "Write batches rolled back"),
            &["job"],
        )?;
        let job_duration_seconds = HistogramVec::new(
            HistogramOpts::new("job_duration_seconds", "Wall time of a job run")
                .buckets(vec![1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 3600.0]),
            &["job"],
        )?;

        registry.register(Box::new(rows_computed_total.clone()))?;
        registry.register(Box::new(rows_written_total.clone()))?;
        registry.register(Box::new(symbols_skipped_total.clone()))?;
        registry.register(Box::new(batches_failed_total.clone()))?;
        registry.register(Box::new(job_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            rows_computed_total,
            rows_written_total,
            symbols_skipped_total,
            batches_failed_total,
            job_duration_seconds,
        })
    }

    pub fn record_run(&self, report: &RunReport, elapsed: Duration) {
        let job = [report.job.as_str()];
        self.rows_computed_total
            .with_label_values(&job)
            .inc_by(report.rows_computed as u64);
        self.rows_written_total
            .with_label_values(&job)
            .inc_by(report.rows_written as u64);
        self.symbols_skipped_total
            .with_label_values(&job)
            .inc_by(report.symbols_skipped as u64);
        self.batches_failed_total
            .with_label_values(&job)
            .inc_by(report.failed_batches.len() as u64);
        self.job_duration_seconds
            .with_label_values(&job)
            .observe(elapsed.as_secs_f64());
    }

    /// Text exposition format of everything registered.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
