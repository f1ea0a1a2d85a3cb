//! Scheduled scraping using tokio-cron-scheduler.
//!
//! # Architecture
//!
//! ```text
//! Cron job (every hour, UTC) ──┐
//!                              ├─► ScrapeScheduler::run_pipeline()
//! POST /api/scheduler/trigger ─┘        │
//!                                       ├─► expire(today)
//!                                       ├─► Aggregator::collect()
//!                                       └─► EventGate::ingest()
//! ```
//!
//! Only one pipeline run executes at a time. The slot is claimed with an
//! atomic compare-and-swap; a fire that finds it taken is rejected, never
//! queued. Timer fires log and skip, manual triggers get
//! [`SchedulerError::AlreadyScraping`].
//!
//! Nothing is armed until [`ScrapeScheduler::start`] is called.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::common::utils::next_top_of_hour;
use crate::domains::events::IngestSummary;
use crate::domains::scraping::{PipelineReport, ScrapePipeline};

/// Top of every hour
pub const DEFAULT_SCRAPE_CRON: &str = "0 0 * * * *";

/// Scheduler lifecycle errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Scheduler already running")]
    AlreadyRunning,

    #[error("Scheduler not running")]
    NotRunning,

    #[error("A scrape is already in progress")]
    AlreadyScraping,

    #[error("Cron scheduler error: {0}")]
    Cron(String),
}

impl SchedulerError {
    fn cron(err: impl std::fmt::Debug) -> Self {
        SchedulerError::Cron(format!("{:?}", err))
    }

    /// True for errors caused by the scheduler's current state rather than a fault
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            SchedulerError::AlreadyRunning
                | SchedulerError::NotRunning
                | SchedulerError::AlreadyScraping
        )
    }
}

pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;

/// Snapshot returned by the status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    /// A cron job is armed
    pub is_running: bool,
    /// A pipeline run is executing right now
    pub is_currently_scraping: bool,
    pub last_run_time: Option<DateTime<Utc>>,
    pub next_run_time: Option<DateTime<Utc>>,
    pub schedule: String,
}

#[derive(Clone)]
struct ArmedJob {
    scheduler: JobScheduler,
    job_id: Uuid,
}

impl ArmedJob {
    /// Next fire time of the armed cron job, as computed by the job scheduler.
    async fn next_fire(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let mut scheduler = self.scheduler.clone();
        match scheduler.next_tick_for_job(self.job_id).await {
            Ok(Some(next)) if next > now => next,
            Ok(_) => next_top_of_hour(now),
            Err(e) => {
                warn!(job_id = %self.job_id, error = ?e, "Failed to read next tick");
                next_top_of_hour(now)
            }
        }
    }
}

#[derive(Default)]
struct SchedulerState {
    last_run_time: Option<DateTime<Utc>>,
    next_run_time: Option<DateTime<Utc>>,
    job: Option<ArmedJob>,
}

/// Owns the cron job and the run slot for the scrape pipeline.
pub struct ScrapeScheduler {
    pipeline: Arc<ScrapePipeline>,
    cron: String,
    state: Mutex<SchedulerState>,
    scraping: AtomicBool,
}

/// Holds the run slot; releasing happens on drop, including during unwinding.
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl ScrapeScheduler {
    pub fn new(pipeline: Arc<ScrapePipeline>, cron: impl Into<String>) -> Self {
        Self {
            pipeline,
            cron: cron.into(),
            state: Mutex::new(SchedulerState::default()),
            scraping: AtomicBool::new(false),
        }
    }

    pub fn with_default_schedule(pipeline: Arc<ScrapePipeline>) -> Self {
        Self::new(pipeline, DEFAULT_SCRAPE_CRON)
    }

    pub fn pipeline(&self) -> &Arc<ScrapePipeline> {
        &self.pipeline
    }

    /// Arm the cron job.
    pub async fn start(self: &Arc<Self>) -> SchedulerResult<()> {
        let mut state = self.state.lock().await;
        if state.job.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }

        let scheduler = JobScheduler::new().await.map_err(SchedulerError::cron)?;

        // Weak: the job lives inside the scheduler this struct owns
        let this: Weak<Self> = Arc::downgrade(self);
        let job = Job::new_async(self.cron.as_str(), move |_uuid, _lock| {
            let this = this.clone();
            Box::pin(async move {
                if let Some(scheduler) = this.upgrade() {
                    scheduler.run_scheduled().await;
                }
            })
        })
        .map_err(SchedulerError::cron)?;

        let job_id = scheduler.add(job).await.map_err(SchedulerError::cron)?;
        scheduler.start().await.map_err(SchedulerError::cron)?;

        let armed = ArmedJob { scheduler, job_id };
        state.next_run_time = Some(armed.next_fire().await);
        state.job = Some(armed);

        info!(cron = %self.cron, %job_id, "Scrape scheduler started");
        Ok(())
    }

    /// Disarm the cron job. A run already in progress finishes normally.
    pub async fn stop(&self) -> SchedulerResult<()> {
        let mut state = self.state.lock().await;
        let Some(mut armed) = state.job.take() else {
            return Err(SchedulerError::NotRunning);
        };

        state.next_run_time = None;

        if let Err(e) = armed.scheduler.remove(&armed.job_id).await {
            warn!(job_id = %armed.job_id, error = ?e, "Failed to remove scrape job");
        }
        armed.scheduler.shutdown().await.map_err(SchedulerError::cron)?;

        info!("Scrape scheduler stopped");
        Ok(())
    }

    /// Run the full pipeline now (expire → collect → ingest).
    pub async fn trigger(&self) -> SchedulerResult<PipelineReport> {
        info!("Manual scrape triggered");
        self.run_pipeline().await
    }

    /// Collect and ingest without expiring anything, sharing the run slot.
    pub async fn scrape_now(&self) -> SchedulerResult<IngestSummary> {
        let _guard = RunGuard::acquire(&self.scraping).ok_or(SchedulerError::AlreadyScraping)?;
        Ok(self.pipeline.scrape().await)
    }

    pub async fn status(&self) -> SchedulerStatus {
        let state = self.state.lock().await;
        SchedulerStatus {
            is_running: state.job.is_some(),
            is_currently_scraping: self.scraping.load(Ordering::Acquire),
            last_run_time: state.last_run_time,
            next_run_time: state.next_run_time,
            schedule: describe_schedule(&self.cron),
        }
    }

    pub fn is_currently_scraping(&self) -> bool {
        self.scraping.load(Ordering::Acquire)
    }

    async fn run_scheduled(&self) {
        info!("Starting scheduled scraping");
        match self.run_pipeline().await {
            Ok(report) => info!(
                expired = report.expired,
                scraped = report.ingest.scraped,
                saved = report.ingest.saved,
                "Scheduled scraping finished"
            ),
            Err(SchedulerError::AlreadyScraping) => {
                warn!("Previous scrape still running, skipping this tick")
            }
            Err(e) => error!(error = %e, "Scheduled scraping failed"),
        }
    }

    async fn run_pipeline(&self) -> SchedulerResult<PipelineReport> {
        let _guard = RunGuard::acquire(&self.scraping).ok_or(SchedulerError::AlreadyScraping)?;

        let started = Utc::now();
        self.state.lock().await.last_run_time = Some(started);

        let report = self.pipeline.run(started.date_naive()).await;

        let armed = self.state.lock().await.job.clone();
        if let Some(armed) = armed {
            let next = armed.next_fire().await;
            let mut state = self.state.lock().await;
            // Skip if the job was stopped or re-armed meanwhile
            if state.job.as_ref().map(|job| job.job_id) == Some(armed.job_id) {
                state.next_run_time = Some(next);
            }
        }

        Ok(report)
    }
}

/// Human-readable description of a cron expression.
pub fn describe_schedule(cron: &str) -> String {
    if cron.trim() == DEFAULT_SCRAPE_CRON {
        "Every hour at 0 minutes (UTC)".to_string()
    } else {
        format!("Cron '{}' (UTC)", cron.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_schedule() {
        assert_eq!(
            describe_schedule(DEFAULT_SCRAPE_CRON),
            "Every hour at 0 minutes (UTC)"
        );
        assert_eq!(
            describe_schedule("0 30 * * * *"),
            "Cron '0 30 * * * *' (UTC)"
        );
    }

    #[test]
    fn test_run_guard_is_exclusive() {
        let flag = AtomicBool::new(false);

        let first = RunGuard::acquire(&flag);
        assert!(first.is_some());
        assert!(RunGuard::acquire(&flag).is_none());

        drop(first);
        assert!(!flag.load(Ordering::Acquire));
        assert!(RunGuard::acquire(&flag).is_some());
    }

    #[test]
    fn test_conflicts_are_flagged() {
        assert!(SchedulerError::AlreadyScraping.is_conflict());
        assert!(SchedulerError::NotRunning.is_conflict());
        assert!(!SchedulerError::Cron("boom".into()).is_conflict());
    }
}
