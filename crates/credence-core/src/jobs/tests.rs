use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::analysis::{
    ConsistencyAnalysis, ImageAnalysis, ImageAssessment, ImageVerdict, ScreenshotRef, TextAnalysis,
};
use crate::report::build_report;

use super::*;

fn shot() -> ScreenshotRef {
    ScreenshotRef::new("a.jpg", "screenshots")
}

fn sample_report() -> Arc<crate::report::AnalysisReport> {
    let region = ImageAnalysis {
        score: 80.0,
        verdict: ImageVerdict::Authentic,
        red_flags: BTreeSet::new(),
    };
    Arc::new(build_report(
        &shot(),
        TextAnalysis {
            score: 60.0,
            red_flags: BTreeSet::new(),
            positive_indicators: BTreeSet::new(),
        },
        ImageAssessment {
            aggregate: region.clone(),
            regions: vec![region],
        },
        ConsistencyAnalysis {
            score: 90.0,
            mismatches: vec![],
        },
        Utc::now(),
    ))
}

fn drive_to_aggregating(registry: &JobRegistry, id: Uuid) {
    registry.advance(id, JobState::Extracting).unwrap();
    registry.advance(id, JobState::Analyzing).unwrap();
    registry.advance(id, JobState::Aggregating).unwrap();
}

#[test]
fn create_starts_pending() {
    let registry = JobRegistry::new();
    let id = registry.create(shot());

    assert_eq!(registry.status(id).unwrap(), JobState::Pending);
    assert_eq!(registry.len(), 1);
}

#[test]
fn status_unknown_id_is_not_found() {
    let registry = JobRegistry::new();
    let missing = Uuid::new_v4();

    assert_eq!(
        registry.status(missing),
        Err(JobQueryError::NotFound(missing))
    );
}

#[test]
fn result_on_pending_job_is_not_complete() {
    let registry = JobRegistry::new();
    let id = registry.create(shot());

    assert_eq!(
        registry.result(id).unwrap_err(),
        JobQueryError::NotComplete {
            id,
            state: JobState::Pending
        }
    );
}

#[test]
fn happy_path_transitions_and_result() {
    let registry = JobRegistry::new();
    let id = registry.create(shot());
    let report = sample_report();

    drive_to_aggregating(&registry, id);
    registry.complete(id, report.clone()).unwrap();

    assert_eq!(registry.status(id).unwrap(), JobState::Complete);
    let fetched = registry.result(id).unwrap();
    assert_eq!(fetched.final_score, report.final_score);
}

#[test]
fn result_is_idempotent_and_byte_identical() {
    let registry = JobRegistry::new();
    let id = registry.create(shot());

    drive_to_aggregating(&registry, id);
    registry.complete(id, sample_report()).unwrap();

    let first = serde_json::to_vec(&*registry.result(id).unwrap()).unwrap();
    let second = serde_json::to_vec(&*registry.result(id).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn failed_job_surfaces_error_info() {
    let registry = JobRegistry::new();
    let id = registry.create(shot());
    registry.advance(id, JobState::Extracting).unwrap();

    let error = ErrorInfo::new(StageName::Extraction, "gateway_timeout", "timed out");
    registry.fail(id, error.clone()).unwrap();

    assert_eq!(registry.status(id).unwrap(), JobState::Failed);
    assert_eq!(
        registry.result(id).unwrap_err(),
        JobQueryError::Failed { id, error }
    );
}

#[test]
fn transitions_cannot_skip_states() {
    let registry = JobRegistry::new();
    let id = registry.create(shot());

    let err = registry.advance(id, JobState::Aggregating).unwrap_err();
    assert!(matches!(err, TransitionError::Invalid { .. }));
}

#[test]
fn terminal_states_are_final() {
    let registry = JobRegistry::new();
    let id = registry.create(shot());

    registry.fail(id, ErrorInfo::cancelled()).unwrap();

    // No transition leaves a terminal state, including to Failed again.
    assert!(registry.advance(id, JobState::Extracting).is_err());
    assert!(registry.fail(id, ErrorInfo::cancelled()).is_err());
    assert!(registry.complete(id, sample_report()).is_err());
}

#[test]
fn complete_requires_aggregating() {
    let registry = JobRegistry::new();
    let id = registry.create(shot());
    registry.advance(id, JobState::Extracting).unwrap();

    assert!(registry.complete(id, sample_report()).is_err());
    // State unchanged by the rejected transition.
    assert_eq!(registry.status(id).unwrap(), JobState::Extracting);
}

#[test]
fn cancel_before_aggregating() {
    let registry = JobRegistry::new();
    let id = registry.create(shot());
    registry.advance(id, JobState::Extracting).unwrap();

    registry.cancel(id).unwrap();

    assert_eq!(registry.status(id).unwrap(), JobState::Failed);
    match registry.result(id).unwrap_err() {
        JobQueryError::Failed { error, .. } => {
            assert_eq!(error.kind, "cancelled");
            assert_eq!(error.stage, StageName::Orchestrator);
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[test]
fn cancel_rejected_once_aggregating() {
    let registry = JobRegistry::new();
    let id = registry.create(shot());
    drive_to_aggregating(&registry, id);

    assert!(matches!(
        registry.cancel(id),
        Err(JobQueryError::NotCancellable { .. })
    ));
}

#[test]
fn snapshot_reflects_state_and_error() {
    let registry = JobRegistry::new();
    let id = registry.create(shot());

    let snapshot = registry.snapshot(id).unwrap();
    assert_eq!(snapshot.job_id, id);
    assert_eq!(snapshot.state, JobState::Pending);
    assert_eq!(snapshot.screenshot_name, "a.jpg");
    assert!(snapshot.error.is_none());

    registry
        .fail(id, ErrorInfo::new(StageName::Consistency, "storage", "boom"))
        .unwrap();
    let snapshot = registry.snapshot(id).unwrap();
    assert_eq!(snapshot.state, JobState::Failed);
    assert_eq!(snapshot.error.unwrap().stage, StageName::Consistency);
}

#[test]
fn summary_counts_states() {
    let registry = JobRegistry::new();
    let a = registry.create(shot());
    let _b = registry.create(shot());
    registry.advance(a, JobState::Extracting).unwrap();

    let summary = registry.summary();
    assert_eq!(summary.total_jobs, 2);
    assert_eq!(summary.status_counts[&JobState::Pending], 1);
    assert_eq!(summary.status_counts[&JobState::Extracting], 1);
    assert_eq!(summary.jobs.len(), 2);
}

#[test]
fn evict_removes_only_old_terminal_jobs() {
    let registry = JobRegistry::new();
    let done = registry.create(shot());
    let active = registry.create(shot());
    registry.fail(done, ErrorInfo::cancelled()).unwrap();

    // Nothing is old enough yet.
    assert_eq!(registry.evict_older_than(Duration::hours(24)), 0);

    // Everything terminal is older than a zero window; the active job stays.
    assert_eq!(registry.evict_older_than(Duration::zero()), 1);
    assert_eq!(registry.len(), 1);
    assert!(registry.status(active).is_ok());
    assert_eq!(
        registry.status(done),
        Err(JobQueryError::NotFound(done))
    );
}
