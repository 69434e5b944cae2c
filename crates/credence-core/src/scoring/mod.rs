//! Score aggregation: weighted final score and verdict banding.
//!
//! The final score is always a deterministic function of the breakdown; it is
//! never set independently.

pub mod types;


pub use types::{ScoreBreakdown, Verdict};

use crate::constants::{
    CONSISTENCY_WEIGHT, CREDIBLE_MIN, HIGHLY_CREDIBLE_MIN, IMAGE_WEIGHT, QUESTIONABLE_MIN,
    TEXT_WEIGHT, UNRELIABLE_MIN,
};

/// Computes the weighted final score, rounded to one decimal place.
///
/// Text is weighted highest (claims are the primary signal), image next,
/// consistency lowest (a derived check).
pub fn final_score(breakdown: &ScoreBreakdown) -> f64 {
    let weighted = TEXT_WEIGHT * breakdown.text_score
        + IMAGE_WEIGHT * breakdown.image_score
        + CONSISTENCY_WEIGHT * breakdown.consistency_score;

    round_one_decimal(weighted)
}

/// Maps a final score to its verdict band. Lower bounds are inclusive:
/// 85.0 is HIGHLY_CREDIBLE, 84.9 is CREDIBLE.
pub fn verdict_for(score: f64) -> Verdict {
    if score >= HIGHLY_CREDIBLE_MIN {
        Verdict::HighlyCredible
    } else if score >= CREDIBLE_MIN {
        Verdict::Credible
    } else if score >= QUESTIONABLE_MIN {
        Verdict::Questionable
    } else if score >= UNRELIABLE_MIN {
        Verdict::Unreliable
    } else {
        Verdict::HighlyUnreliable
    }
}

/// Computes the final score and its verdict in one step.
pub fn aggregate(breakdown: &ScoreBreakdown) -> (f64, Verdict) {
    let score = final_score(breakdown);
    (score, verdict_for(score))
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
