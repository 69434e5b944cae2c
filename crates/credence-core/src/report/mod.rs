//! The analysis report: the permanent artifact of a completed job.
//!
//! Field names and verdict strings are a compatibility contract for any
//! consumer reading persisted reports; do not rename.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{ConsistencyAnalysis, ImageAssessment, ScreenshotRef, TextAnalysis};
use crate::scoring::{self, ScoreBreakdown, Verdict};
use crate::storage::{ObjectStore, StorageError};

/// Per-stage results embedded in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    pub text_analysis: TextAnalysis,
    pub image_analysis: ImageAssessment,
    pub consistency_analysis: ConsistencyAnalysis,
}

/// Immutable credibility report for one screenshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub screenshot_name: String,
    pub final_score: f64,
    pub verdict: Verdict,
    pub score_breakdown: ScoreBreakdown,
    pub detailed_analysis: DetailedAnalysis,
    pub created_at: DateTime<Utc>,
}

/// Builds a report from the three stage outputs.
///
/// The breakdown records the stage scores as produced; `final_score` is
/// always derived from that breakdown via [`scoring::aggregate`].
pub fn build_report(
    screenshot: &ScreenshotRef,
    text: TextAnalysis,
    image: ImageAssessment,
    consistency: ConsistencyAnalysis,
    created_at: DateTime<Utc>,
) -> AnalysisReport {
    let breakdown = ScoreBreakdown::new(text.score, image.aggregate.score, consistency.score);
    let (final_score, verdict) = scoring::aggregate(&breakdown);

    AnalysisReport {
        screenshot_name: screenshot.name.clone(),
        final_score,
        verdict,
        score_breakdown: breakdown,
        detailed_analysis: DetailedAnalysis {
            text_analysis: text,
            image_analysis: image,
            consistency_analysis: consistency,
        },
        created_at,
    }
}

/// Object name a report is persisted under: `{base}_{YYYYMMDD_HHMMSS}_report.json`.
pub fn report_object_name(screenshot_name: &str, created_at: DateTime<Utc>) -> String {
    let base = screenshot_name
        .rsplit_once('.')
        .map(|(base, _ext)| base)
        .unwrap_or(screenshot_name);
    format!("{base}_{}_report.json", created_at.format("%Y%m%d_%H%M%S"))
}

/// Serializes and stores the report, returning the object name.
pub async fn persist_report(
    store: &dyn ObjectStore,
    container: &str,
    report: &AnalysisReport,
) -> Result<String, StorageError> {
    let name = report_object_name(&report.screenshot_name, report.created_at);
    let json = serde_json::to_vec_pretty(report)
        .map_err(|e| StorageError::Io(format!("report serialization failed: {e}")))?;

    store.store(container, &name, &json).await?;
    info!(container, name, final_score = report.final_score, "report persisted");
    Ok(name)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::TimeZone;

    use crate::analysis::{ImageAnalysis, ImageVerdict};
    use crate::storage::MemoryObjectStore;

    use super::*;

    fn sample_report() -> AnalysisReport {
        let screenshot = ScreenshotRef::new("a.jpg", "screenshots");
        let text = TextAnalysis {
            score: 60.0,
            red_flags: BTreeSet::from(["sensational headline".to_string()]),
            positive_indicators: BTreeSet::new(),
        };
        let region = ImageAnalysis {
            score: 80.0,
            verdict: ImageVerdict::Authentic,
            red_flags: BTreeSet::new(),
        };
        let image = ImageAssessment {
            aggregate: region.clone(),
            regions: vec![region],
        };
        let consistency = ConsistencyAnalysis {
            score: 90.0,
            mismatches: vec![],
        };
        let created_at = Utc.with_ymd_and_hms(2025, 9, 17, 12, 30, 45).unwrap();

        build_report(&screenshot, text, image, consistency, created_at)
    }

    #[test]
    fn final_score_is_derived_from_breakdown() {
        let report = sample_report();

        assert_eq!(report.final_score, 74.5);
        assert_eq!(report.verdict, Verdict::Credible);
        assert_eq!(report.score_breakdown.text_score, 60.0);
        assert_eq!(report.score_breakdown.image_score, 80.0);
        assert_eq!(report.score_breakdown.consistency_score, 90.0);
    }

    #[test]
    fn report_json_contract() {
        let report = sample_report();
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["screenshot_name"], "a.jpg");
        assert_eq!(value["final_score"], 74.5);
        assert_eq!(value["verdict"], "CREDIBLE");
        assert_eq!(value["score_breakdown"]["text_score"], 60.0);
        assert_eq!(value["score_breakdown"]["image_score"], 80.0);
        assert_eq!(value["score_breakdown"]["consistency_score"], 90.0);
        assert_eq!(
            value["detailed_analysis"]["text_analysis"]["score"],
            60.0
        );
        assert_eq!(
            value["detailed_analysis"]["image_analysis"]["aggregate"]["verdict"],
            "AUTHENTIC"
        );
        assert_eq!(
            value["detailed_analysis"]["consistency_analysis"]["score"],
            90.0
        );
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = sample_report();
        let json = serde_json::to_string(&report).unwrap();
        let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, report);
    }

    #[test]
    fn object_name_strips_extension_and_stamps_time() {
        let created_at = Utc.with_ymd_and_hms(2025, 9, 17, 12, 30, 45).unwrap();

        assert_eq!(
            report_object_name("a.jpg", created_at),
            "a_20250917_123045_report.json"
        );
        assert_eq!(
            report_object_name("no-extension", created_at),
            "no-extension_20250917_123045_report.json"
        );
    }

    #[tokio::test]
    async fn persist_writes_to_report_container() {
        let store = MemoryObjectStore::new();
        let report = sample_report();

        let name = persist_report(&store, "reports", &report).await.unwrap();

        let bytes = store.get("reports", &name).unwrap();
        let parsed: AnalysisReport = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, report);
    }
}
