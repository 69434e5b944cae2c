//! Job registry: the only shared mutable state in the system.
//!
//! All transitions go through the registry so that state, report, error, and
//! `updated_at` change under a single write-lock acquisition; a reader can
//! never observe `Complete` without its report or `Failed` without its error.

pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{JobQueryError, TransitionError};
pub use types::{ErrorInfo, Job, JobSnapshot, JobState, JobSummary, StageName};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::ScreenshotRef;
use crate::report::AnalysisReport;

/// Tracks in-flight and completed jobs, keyed by job id.
#[derive(Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a job in `Pending` and returns its id.
    pub fn create(&self, screenshot: ScreenshotRef) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let job = Job {
            id,
            screenshot,
            state: JobState::Pending,
            report: None,
            error: None,
            created_at: now,
            updated_at: now,
        };

        self.jobs.write().insert(id, job);
        debug!(job_id = %id, "job created");
        id
    }

    /// Returns the job's current state.
    pub fn status(&self, id: Uuid) -> Result<JobState, JobQueryError> {
        self.jobs
            .read()
            .get(&id)
            .map(|job| job.state)
            .ok_or(JobQueryError::NotFound(id))
    }

    /// Returns the completed report.
    ///
    /// Fails with `NotFound` for unknown ids, `NotComplete` for jobs still in
    /// flight, and surfaces the stored [`ErrorInfo`] for failed jobs.
    pub fn result(&self, id: Uuid) -> Result<Arc<AnalysisReport>, JobQueryError> {
        let jobs = self.jobs.read();
        let job = jobs.get(&id).ok_or(JobQueryError::NotFound(id))?;

        match job.state {
            JobState::Complete => Ok(job
                .report
                .clone()
                // Registry invariant: Complete implies report is set.
                .ok_or(JobQueryError::NotComplete {
                    id,
                    state: job.state,
                })?),
            JobState::Failed => Err(JobQueryError::Failed {
                id,
                error: job.error.clone().unwrap_or_else(ErrorInfo::cancelled),
            }),
            state => Err(JobQueryError::NotComplete { id, state }),
        }
    }

    /// Returns the screenshot reference a job was submitted for.
    pub fn screenshot(&self, id: Uuid) -> Result<ScreenshotRef, JobQueryError> {
        self.jobs
            .read()
            .get(&id)
            .map(|job| job.screenshot.clone())
            .ok_or(JobQueryError::NotFound(id))
    }

    /// Returns the caller-facing status row for a job.
    pub fn snapshot(&self, id: Uuid) -> Result<JobSnapshot, JobQueryError> {
        self.jobs
            .read()
            .get(&id)
            .map(JobSnapshot::of)
            .ok_or(JobQueryError::NotFound(id))
    }

    /// Returns totals per state plus all job rows, newest first.
    pub fn summary(&self) -> JobSummary {
        let jobs = self.jobs.read();

        let mut status_counts: BTreeMap<JobState, usize> = BTreeMap::new();
        let mut rows: Vec<JobSnapshot> = Vec::with_capacity(jobs.len());
        for job in jobs.values() {
            *status_counts.entry(job.state).or_default() += 1;
            rows.push(JobSnapshot::of(job));
        }
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        JobSummary {
            total_jobs: rows.len(),
            status_counts,
            jobs: rows,
        }
    }

    /// Advances a job to a non-terminal `next` state.
    pub fn advance(&self, id: Uuid, next: JobState) -> Result<(), TransitionError> {
        self.transition(id, next, None, None)
    }

    /// Marks a job `Complete`, attaching its report atomically.
    pub fn complete(&self, id: Uuid, report: Arc<AnalysisReport>) -> Result<(), TransitionError> {
        self.transition(id, JobState::Complete, Some(report), None)
    }

    /// Marks a job `Failed`, attaching the attribution atomically.
    pub fn fail(&self, id: Uuid, error: ErrorInfo) -> Result<(), TransitionError> {
        warn!(job_id = %id, %error, "job failed");
        self.transition(id, JobState::Failed, None, Some(error))
    }

    /// Cancels a job that has not yet reached `Aggregating`.
    ///
    /// The running task observes the terminal state at its next transition
    /// attempt and abandons; in-flight external calls are not awaited.
    pub fn cancel(&self, id: Uuid) -> Result<(), JobQueryError> {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(&id).ok_or(JobQueryError::NotFound(id))?;

        if job.state >= JobState::Aggregating {
            return Err(JobQueryError::NotCancellable {
                id,
                state: job.state,
            });
        }

        job.state = JobState::Failed;
        job.error = Some(ErrorInfo::cancelled());
        job.updated_at = Utc::now();
        info!(job_id = %id, "job cancelled");
        Ok(())
    }

    /// Removes terminal jobs untouched for longer than `max_age`.
    /// Returns the number of evicted jobs.
    pub fn evict_older_than(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut jobs = self.jobs.write();
        let before = jobs.len();
        jobs.retain(|_, job| !(job.state.is_terminal() && job.updated_at < cutoff));
        let evicted = before - jobs.len();
        if evicted > 0 {
            info!(evicted, "evicted expired jobs");
        }
        evicted
    }

    /// Number of tracked jobs.
    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    /// Returns `true` if no jobs are tracked.
    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }

    fn transition(
        &self,
        id: Uuid,
        next: JobState,
        report: Option<Arc<AnalysisReport>>,
        error: Option<ErrorInfo>,
    ) -> Result<(), TransitionError> {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(&id).ok_or(TransitionError::NotFound(id))?;

        if !job.state.can_transition_to(next) {
            return Err(TransitionError::Invalid {
                id,
                from: job.state,
                to: next,
            });
        }

        debug!(job_id = %id, from = %job.state, to = %next, "job transition");
        job.state = next;
        job.report = report;
        job.error = error;
        job.updated_at = Utc::now();
        Ok(())
    }
}
