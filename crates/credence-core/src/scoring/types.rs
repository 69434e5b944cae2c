use serde::{Deserialize, Serialize};

/// The three stage scores feeding the final aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub text_score: f64,
    pub image_score: f64,
    pub consistency_score: f64,
}

impl ScoreBreakdown {
    pub fn new(text_score: f64, image_score: f64, consistency_score: f64) -> Self {
        Self {
            text_score,
            image_score,
            consistency_score,
        }
    }
}

/// Discrete credibility category derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "HIGHLY_CREDIBLE")]
    HighlyCredible,
    #[serde(rename = "CREDIBLE")]
    Credible,
    #[serde(rename = "QUESTIONABLE")]
    Questionable,
    #[serde(rename = "UNRELIABLE")]
    Unreliable,
    #[serde(rename = "HIGHLY_UNRELIABLE")]
    HighlyUnreliable,
}

impl Verdict {
    /// The wire/report string for this verdict.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::HighlyCredible => "HIGHLY_CREDIBLE",
            Verdict::Credible => "CREDIBLE",
            Verdict::Questionable => "QUESTIONABLE",
            Verdict::Unreliable => "UNRELIABLE",
            Verdict::HighlyUnreliable => "HIGHLY_UNRELIABLE",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
