//! Credence library crate (used by the server and integration tests).
//!
//! Credence scores the credibility of news screenshots: one submitted image
//! is driven through OCR extraction, text-credibility, image-authenticity,
//! and text-image-consistency stages, and the partial verdicts are combined
//! into a weighted final score and report.
//!
//! # Public API Surface
//!
//! ## Core Types (Stable)
//! - [`Config`], [`ConfigError`] - Service configuration
//! - [`ScreenshotRef`], [`ExtractionResult`], [`TextAnalysis`],
//!   [`ImageAssessment`], [`ConsistencyAnalysis`] - Stage data model
//! - [`AnalysisReport`], [`ScoreBreakdown`], [`Verdict`] - The report contract
//! - [`Job`], [`JobState`], [`JobRegistry`] - Asynchronous job tracking
//!
//! ## Pipeline
//! - [`Orchestrator`] - Stage sequencing and error isolation
//! - [`RetryPolicy`] - Bounded retry with exponential backoff
//! - Stage analyzers in [`analysis`]
//!
//! ## Collaborator Seams
//! - [`ObjectStore`] / [`FsObjectStore`] - Blob storage
//! - [`ModelGateway`] / [`HttpModelGateway`] - Vision/language inference
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod analysis;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod jobs;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod storage;

pub use analysis::{
    BoundingBox, ConsistencyAnalysis, ConsistencyStage, ExtractionResult, ExtractionStage,
    ImageAnalysis, ImageAssessment, ImageStage, ImageVerdict, ScreenshotRef, StageError,
    TextAnalysis, TextStage, INSUFFICIENT_TEXT_FLAG,
};
pub use config::{Config, ConfigError};
pub use gateway::{GatewayError, HttpGatewayConfig, HttpModelGateway, ModelGateway, ModelRequest};
#[cfg(any(test, feature = "mock"))]
pub use gateway::MockModelGateway;
pub use jobs::{
    ErrorInfo, Job, JobQueryError, JobRegistry, JobSnapshot, JobState, JobSummary, StageName,
    TransitionError,
};
pub use pipeline::{Orchestrator, RetryPolicy};
pub use report::{build_report, persist_report, report_object_name, AnalysisReport, DetailedAnalysis};
pub use scoring::{aggregate, final_score, verdict_for, ScoreBreakdown, Verdict};
pub use storage::{FsObjectStore, ObjectStore, StorageError};
#[cfg(any(test, feature = "mock"))]
pub use storage::MemoryObjectStore;
