//! Cron-based scheduler for the daily pipeline run

use crate::core::runtime::PipelineRuntime;
use crate::error::{Error, Result};
use chrono::Local;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Fires `PipelineRuntime::run_daily` on a cron schedule in local time.
pub struct JobScheduler {
    runtime: Arc<PipelineRuntime>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl JobScheduler {
    /// `cron_expr` uses six fields: second minute hour day month weekday.
    pub fn new(runtime: Arc<PipelineRuntime>, cron_expr: &str) -> Result<Self> {
        let schedule = Schedule::from_str(cron_expr).map_err(|e| {
            Error::Schedule(format!("Invalid cron expression '{}': {}", cron_expr, e))
        })?;

        info!(cron = %cron_expr, "JobScheduler: created with cron '{}'", cron_expr);

        Ok(Self {
            runtime,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Next fire time after now, if the schedule has one.
    pub fn next_run(&self) -> Option<chrono::DateTime<Local>> {
        self.schedule.upcoming(Local).next()
    }

    pub async fn start(&self) -> Result<()> {
        let runtime = self.runtime.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("JobScheduler: started, waiting for cron schedule...");

            loop {
                let Some(next_tick) = schedule.upcoming(Local).next() else {
                    error!("JobScheduler: schedule has no upcoming times, stopping");
                    break;
                };

                let now = Local::now();
                if next_tick > now {
                    let wait = (next_tick - now).to_std().unwrap_or_default();
                    info!(next = %next_tick, "JobScheduler: next run at {}", next_tick);
                    tokio::time::sleep(wait).await;
                }

                let as_of = Local::now().date_naive();
                match runtime.run_daily(as_of).await {
                    Ok(Some(report)) => {
                        info!(date = %as_of, ?report, "JobScheduler: daily run finished");
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!(date = %as_of, error = %e, "JobScheduler: daily run failed");
                    }
                }
            }
        });

        *self.handle.write().await = Some(handle);

        info!("JobScheduler: started successfully");
        Ok(())
    }

    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("JobScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}
