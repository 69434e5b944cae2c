use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::ScreenshotRef;
use crate::report::AnalysisReport;

/// Lifecycle state of a job. Transitions only move forward; `Complete` and
/// `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Extracting,
    Analyzing,
    Aggregating,
    Complete,
    Failed,
}

impl JobState {
    /// Returns `true` for `Complete` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Complete | JobState::Failed)
    }

    /// Returns `true` if `next` is a legal forward transition from `self`.
    ///
    /// Any non-terminal state may fail; success states advance one step.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == JobState::Failed {
            return true;
        }
        matches!(
            (self, next),
            (JobState::Pending, JobState::Extracting)
                | (JobState::Extracting, JobState::Analyzing)
                | (JobState::Analyzing, JobState::Aggregating)
                | (JobState::Aggregating, JobState::Complete)
        )
    }

    /// The wire string for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Extracting => "EXTRACTING",
            JobState::Analyzing => "ANALYZING",
            JobState::Aggregating => "AGGREGATING",
            JobState::Complete => "COMPLETE",
            JobState::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pipeline stage an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Extraction,
    TextCredibility,
    ImageAuthenticity,
    Consistency,
    Aggregation,
    /// Not a stage: failures imposed on the job from outside (cancellation).
    Orchestrator,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Extraction => "extraction",
            StageName::TextCredibility => "text_credibility",
            StageName::ImageAuthenticity => "image_authenticity",
            StageName::Consistency => "consistency",
            StageName::Aggregation => "aggregation",
            StageName::Orchestrator => "orchestrator",
        }
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full attribution for a failed job: which stage, what kind, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub stage: StageName,
    pub kind: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(stage: StageName, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// The attribution recorded when a job is cancelled by its caller.
    pub fn cancelled() -> Self {
        Self::new(StageName::Orchestrator, "cancelled", "job cancelled by caller")
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} stage failed ({}): {}", self.stage, self.kind, self.message)
    }
}

/// One end-to-end analysis request and its lifecycle state.
///
/// Owned exclusively by the registry; `report` is set iff `Complete`,
/// `error` iff `Failed`.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub screenshot: ScreenshotRef,
    pub state: JobState,
    pub report: Option<Arc<AnalysisReport>>,
    pub error: Option<ErrorInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-facing view of a job's current status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: Uuid,
    pub screenshot_name: String,
    pub state: JobState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobSnapshot {
    pub(crate) fn of(job: &Job) -> Self {
        Self {
            job_id: job.id,
            screenshot_name: job.screenshot.name.clone(),
            state: job.state,
            error: job.error.clone(),
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Registry-wide overview: totals per state plus the job rows.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub total_jobs: usize,
    pub status_counts: std::collections::BTreeMap<JobState, usize>,
    pub jobs: Vec<JobSnapshot>,
}
