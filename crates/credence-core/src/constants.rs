//! Cross-cutting policy constants.
//!
//! Weights and verdict thresholds are the scoring contract: the persisted
//! report format depends on them, so changing any value here is a breaking
//! change for report consumers.

/// Weight of the text-credibility score in the final aggregate.
pub const TEXT_WEIGHT: f64 = 0.40;
/// Weight of the image-authenticity score in the final aggregate.
pub const IMAGE_WEIGHT: f64 = 0.35;
/// Weight of the text-image consistency score in the final aggregate.
pub const CONSISTENCY_WEIGHT: f64 = 0.25;

/// Inclusive lower bound of the HIGHLY_CREDIBLE band.
pub const HIGHLY_CREDIBLE_MIN: f64 = 85.0;
/// Inclusive lower bound of the CREDIBLE band.
pub const CREDIBLE_MIN: f64 = 65.0;
/// Inclusive lower bound of the QUESTIONABLE band.
pub const QUESTIONABLE_MIN: f64 = 45.0;
/// Inclusive lower bound of the UNRELIABLE band.
pub const UNRELIABLE_MIN: f64 = 25.0;

/// Extracted text shorter than this (after trimming) is not worth a model
/// call; the text stage short-circuits to a zero score.
pub const MIN_TEXT_LEN: usize = 10;

/// Screenshots smaller than this are rejected before OCR.
pub const MIN_SCREENSHOT_BYTES: usize = 1000;

/// Screenshots larger than this are rejected at submission.
pub const MAX_SCREENSHOT_BYTES: usize = 10 * 1024 * 1024;

/// Default container holding uploaded screenshots.
pub const SCREENSHOT_CONTAINER: &str = "screenshots";
/// Default container holding persisted analysis reports.
pub const REPORT_CONTAINER: &str = "reports";

/// Default number of attempts for a retryable external call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default base delay for exponential backoff, in milliseconds.
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 250;
/// Default backoff multiplier between attempts.
pub const DEFAULT_BACKOFF_MULTIPLIER: u32 = 2;

/// File extensions accepted as screenshots (matched case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "tiff"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        assert!((TEXT_WEIGHT + IMAGE_WEIGHT + CONSISTENCY_WEIGHT - 1.0).abs() < 1e-12);
    }

    #[test]
    fn verdict_bands_are_descending() {
        assert!(HIGHLY_CREDIBLE_MIN > CREDIBLE_MIN);
        assert!(CREDIBLE_MIN > QUESTIONABLE_MIN);
        assert!(QUESTIONABLE_MIN > UNRELIABLE_MIN);
        assert!(UNRELIABLE_MIN > 0.0);
    }
}
