//! Background sweep that repairs missed recurrence spawns.
//!
//! Successor tasks are normally created synchronously when a task is
//! completed. If that write is lost (crash between the completion and the
//! spawn, or an older client that never spawned), the sweeper picks it up:
//! it periodically scans recently completed recurring tasks and re-applies
//! recurrence to each one. Spawning is at-least-once, so the cursor below
//! is what keeps a healthy system from duplicating successors.

use crate::error::CoreError;
use crate::repository::TaskRepository;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Seconds between sweeps when running in a loop.
    pub poll_interval_secs: u64,
    /// How far back the first sweep looks for completed recurring tasks.
    pub lookback_hours: i64,
    /// Attempts per task before giving up on it for this sweep.
    pub max_attempts: u32,
    /// Base of the exponential backoff between attempts, in seconds.
    pub backoff_base_secs: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 3600,
            lookback_hours: 24,
            max_attempts: 3,
            backoff_base_secs: 2,
        }
    }
}

/// Outcome of a single sweep pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub examined: usize,
    pub spawned: usize,
    pub failures: usize,
}

pub struct RecurrenceSweeper<R> {
    repo: Arc<R>,
    config: SweepConfig,
    cursor: DateTime<Utc>,
}

impl<R> RecurrenceSweeper<R>
where
    R: TaskRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>, config: SweepConfig) -> Self {
        let cursor = Utc::now() - ChronoDuration::hours(config.lookback_hours);
        Self {
            repo,
            config,
            cursor,
        }
    }

    /// Run forever, sweeping every `poll_interval_secs`. The first tick
    /// fires immediately.
    pub async fn run(&mut self) {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));
        loop {
            ticker.tick().await;
            match self.sweep_once().await {
                Ok(summary) => {
                    info!(
                        examined = summary.examined,
                        spawned = summary.spawned,
                        failures = summary.failures,
                        "recurrence sweep finished"
                    );
                }
                Err(e) => {
                    // A failed scan leaves the cursor alone; the next tick
                    // covers the same window again.
                    error!(error = %e, "recurrence sweep failed");
                }
            }
        }
    }

    /// Scan completed recurring tasks since the cursor and re-apply
    /// recurrence to each. Per-task failures are retried with exponential
    /// backoff and then counted, never propagated; only a failure of the
    /// scan itself is an error.
    pub async fn sweep_once(&mut self) -> Result<SweepSummary, CoreError> {
        let sweep_start = Utc::now();
        let candidates = self.repo.find_completed_recurring_since(self.cursor).await?;
        debug!(count = candidates.len(), cursor = %self.cursor, "sweep candidates");

        let mut summary = SweepSummary::default();
        for task in &candidates {
            summary.examined += 1;
            match self.apply_with_retry(task.id, &task.user_id).await {
                Ok(Some(next)) => {
                    summary.spawned += 1;
                    debug!(task_id = %task.id, next_id = %next.id, "spawned successor");
                }
                Ok(None) => {}
                Err(e) => {
                    summary.failures += 1;
                    error!(task_id = %task.id, error = %e, "giving up on task this sweep");
                }
            }
        }

        self.cursor = sweep_start;
        Ok(summary)
    }

    async fn apply_with_retry(
        &self,
        task_id: uuid::Uuid,
        user_id: &str,
    ) -> Result<Option<crate::models::Task>, CoreError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.repo.apply_recurrence(task_id, user_id).await {
                Ok(next) => return Ok(next),
                Err(e) if attempt < self.config.max_attempts => {
                    let delay = self.config.backoff_base_secs.saturating_pow(attempt);
                    warn!(
                        task_id = %task_id,
                        attempt,
                        delay_secs = delay,
                        error = %e,
                        "recurrence apply failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
