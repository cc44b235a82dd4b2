//! Pipeline runtime, scheduler and metrics

use crate::test_utils::{
    create_test_bars, day, indicator_config, stored_indicator, test_context,
    test_context_with_metrics,
};
use dailyta::config::PipelineConfig;
use dailyta::core::runtime::{PipelineRuntime, Stage};
use dailyta::core::scheduler::JobScheduler;
use dailyta::db::MemoryStore;
use dailyta::Error;
use std::sync::Arc;

fn pipeline_config() -> PipelineConfig {
    PipelineConfig {
        indicators: indicator_config(),
        ..PipelineConfig::default()
    }
}

fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::new()
            .with_symbols(["AAA"])
            .with_prices(create_test_bars("AAA", 120, 100.0)),
    )
}

#[tokio::test]
async fn pipeline_runs_indicators_then_signals() {
    let store = seeded_store();
    let runtime = PipelineRuntime::new(&pipeline_config(), test_context(store.clone()));

    // day(119) is a Monday
    let report = runtime.run_once(Stage::All, day(119)).await.unwrap();

    let indicators = report.indicators.unwrap();
    assert_eq!(indicators.rows_written, 120);

    let signals = report.signals.unwrap();
    assert_eq!(signals.start_date, day(109));
    assert_eq!(signals.rows_computed, 11);
    assert_eq!(signals.rows_written, 11);
    assert_eq!(store.signals().await.len(), 11);
}

#[tokio::test]
async fn pipeline_second_run_is_idempotent() {
    let store = seeded_store();
    let runtime = PipelineRuntime::new(&pipeline_config(), test_context(store.clone()));

    runtime.run_once(Stage::All, day(119)).await.unwrap();
    let report = runtime.run_once(Stage::All, day(119)).await.unwrap();

    assert_eq!(report.indicators.unwrap().rows_written, 0);
    assert_eq!(report.signals.unwrap().rows_written, 0);
}

#[tokio::test]
async fn pipeline_signals_stage_only() {
    let store = Arc::new(MemoryStore::new().with_indicators([
        stored_indicator("AAA", day(10), 102.0, 100.0, 48.0, -0.1, 0.05),
        stored_indicator("AAA", day(11), 103.0, 100.0, 50.0, 0.2, 0.1),
    ]));
    let runtime = PipelineRuntime::new(&pipeline_config(), test_context(store.clone()));

    let report = runtime.run_once(Stage::Signals, day(12)).await.unwrap();

    assert!(report.indicators.is_none());
    assert_eq!(report.signals.unwrap().rows_written, 2);
}

#[tokio::test]
async fn pipeline_indicators_stage_only() {
    let store = seeded_store();
    let runtime = PipelineRuntime::new(&pipeline_config(), test_context(store.clone()));

    let report = runtime.run_once(Stage::Indicators, day(119)).await.unwrap();

    assert!(report.signals.is_none());
    assert!(store.signals().await.is_empty());
}

#[tokio::test]
async fn pipeline_skips_weekends() {
    let store = seeded_store();
    let runtime = PipelineRuntime::new(&pipeline_config(), test_context(store.clone()));

    // day(5) is a Saturday
    let report = runtime.run_daily(day(5)).await.unwrap();

    assert!(report.is_none());
    assert!(store.indicators().await.is_empty());
}

#[tokio::test]
async fn pipeline_daily_run_on_weekday() {
    let store = seeded_store();
    let runtime = PipelineRuntime::new(&pipeline_config(), test_context(store.clone()));

    let report = runtime.run_daily(day(119)).await.unwrap().unwrap();
    assert_eq!(report.as_of, day(119));
    assert!(report.indicators.is_some());
    assert!(report.signals.is_some());
}

#[tokio::test]
async fn pipeline_report_serializes() {
    let store = seeded_store();
    let runtime = PipelineRuntime::new(&pipeline_config(), test_context(store));

    let report = runtime.run_once(Stage::Indicators, day(119)).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["as_of"], "2024-04-29");
    assert_eq!(json["indicators"]["job"], "indicators");
    assert_eq!(json["indicators"]["rows_written"], 120);
    assert!(json["signals"].is_null());
}

#[tokio::test]
async fn pipeline_records_metrics() {
    let store = seeded_store();
    let (ctx, metrics) = test_context_with_metrics(store);
    let runtime = PipelineRuntime::new(&pipeline_config(), ctx);

    runtime.run_once(Stage::All, day(119)).await.unwrap();

    assert_eq!(
        metrics
            .rows_written_total
            .with_label_values(&["indicators"])
            .get(),
        120
    );
    let rendered = metrics.render().unwrap();
    assert!(rendered.contains("dailyta_rows_written_total"));
    assert!(rendered.contains("dailyta_job_duration_seconds"));
}

#[tokio::test]
async fn scheduler_rejects_invalid_cron() {
    let runtime = Arc::new(PipelineRuntime::new(
        &pipeline_config(),
        test_context(seeded_store()),
    ));
    let result = JobScheduler::new(runtime, "every evening");
    assert!(matches!(result, Err(Error::Schedule(_))));
}

#[tokio::test]
async fn scheduler_start_and_stop() {
    let runtime = Arc::new(PipelineRuntime::new(
        &pipeline_config(),
        test_context(seeded_store()),
    ));
    let scheduler = JobScheduler::new(runtime, "0 30 18 * * Mon-Fri").unwrap();

    assert!(scheduler.next_run().is_some());
    assert!(!scheduler.is_running().await);

    scheduler.start().await.unwrap();
    assert!(scheduler.is_running().await);

    scheduler.stop().await;
    assert!(!scheduler.is_running().await);
}
