//! Pipeline orchestrator: drives one job through the four analysis stages.
//!
//! Stage sequencing: extraction first; text-credibility and image-authenticity
//! concurrently (they share only read-only extraction output); consistency
//! after both; then aggregation and report persistence. Any stage failure
//! fails the whole job: the score formula needs all four inputs, so a
//! missing one makes the aggregate undefined rather than approximate.

pub mod retry;

pub use retry::RetryPolicy;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::{
    ConsistencyStage, ExtractionStage, ImageStage, ScreenshotRef, StageError, TextStage,
};
use crate::gateway::ModelGateway;
use crate::jobs::{ErrorInfo, JobRegistry, JobState, StageName};
use crate::report::{build_report, persist_report};
use crate::storage::ObjectStore;

/// Owns the collaborators and runs jobs to a terminal state.
///
/// The registry is passed in explicitly; the orchestrator holds no other
/// mutable state, so any number of jobs may run concurrently.
pub struct Orchestrator {
    store: Arc<dyn ObjectStore>,
    gateway: Arc<dyn ModelGateway>,
    registry: Arc<JobRegistry>,
    report_container: String,
    retry: RetryPolicy,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        gateway: Arc<dyn ModelGateway>,
        registry: Arc<JobRegistry>,
        report_container: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            gateway,
            registry,
            report_container: report_container.into(),
            retry,
        }
    }

    /// The job registry this orchestrator reports into.
    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Creates a job and spawns its pipeline task. Returns immediately; the
    /// caller polls the registry for progress.
    pub fn submit(self: &Arc<Self>, screenshot: ScreenshotRef) -> Uuid {
        let id = self.registry.create(screenshot);
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            orchestrator.run_job(id).await;
        });
        id
    }

    /// Runs the pipeline for an already-created job until it reaches a
    /// terminal state. Exposed for callers that want to await completion.
    ///
    /// Every error is caught here and recorded as a `Failed` transition;
    /// nothing escapes the task. A transition rejected by the registry means
    /// the job was cancelled underneath us, and the run is abandoned.
    pub async fn run_job(&self, id: Uuid) {
        let Ok(screenshot) = self.registry.screenshot(id) else {
            debug!(job_id = %id, "job evicted before start");
            return;
        };
        debug!(job_id = %id, screenshot = %screenshot, "pipeline starting");

        if self.registry.advance(id, JobState::Extracting).is_err() {
            return;
        }

        let extraction_stage = ExtractionStage::new(self.store.clone(), self.gateway.clone());
        let extraction = match self
            .retry
            .run("extraction", || extraction_stage.run(&screenshot))
            .await
        {
            Ok(extraction) => extraction,
            Err(e) => {
                self.fail_job(id, StageName::Extraction, &e);
                return;
            }
        };

        if self.registry.advance(id, JobState::Analyzing).is_err() {
            return;
        }

        let text_stage = TextStage::new(self.gateway.clone());
        let image_stage = ImageStage::new(self.store.clone(), self.gateway.clone());

        let (text_result, image_result) = tokio::join!(
            self.retry.run("text_credibility", || text_stage.run(&extraction.text)),
            self.retry.run("image_authenticity", || image_stage
                .run(&screenshot, &extraction.image_regions)),
        );

        let text = match text_result {
            Ok(text) => text,
            Err(e) => {
                self.fail_job(id, StageName::TextCredibility, &e);
                return;
            }
        };
        let image = match image_result {
            Ok(image) => image,
            Err(e) => {
                self.fail_job(id, StageName::ImageAuthenticity, &e);
                return;
            }
        };

        let consistency_stage = ConsistencyStage::new(self.gateway.clone());
        let consistency = match self
            .retry
            .run("consistency", || {
                consistency_stage.run(&extraction.text, &image.aggregate, &extraction.region_notes)
            })
            .await
        {
            Ok(consistency) => consistency,
            Err(e) => {
                self.fail_job(id, StageName::Consistency, &e);
                return;
            }
        };

        if self.registry.advance(id, JobState::Aggregating).is_err() {
            return;
        }

        let report = Arc::new(build_report(
            &screenshot,
            text,
            image,
            consistency,
            Utc::now(),
        ));

        let store = self.store.as_ref();
        let container = self.report_container.as_str();
        let report_ref = &*report;
        let persisted = self
            .retry
            .run("persist_report", move || async move {
                persist_report(store, container, report_ref)
                    .await
                    .map_err(StageError::from)
            })
            .await;

        if let Err(e) = persisted {
            self.fail_job(id, StageName::Aggregation, &e);
            return;
        }

        if self.registry.complete(id, report.clone()).is_ok() {
            info!(
                job_id = %id,
                final_score = report.final_score,
                verdict = %report.verdict,
                "job complete"
            );
        }
    }

    fn fail_job(&self, id: Uuid, stage: StageName, error: &StageError) {
        // Ignore the result: the job may already be terminal (cancelled).
        let _ = self
            .registry
            .fail(id, ErrorInfo::new(stage, error.kind(), error.to_string()));
    }
}
