//! Interpretation of a model score as a screening outcome

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binary screening outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Positive,
    Negative,
}

impl Outcome {
    /// Positive when the score is strictly above the threshold.
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score > threshold {
            Outcome::Positive
        } else {
            Outcome::Negative
        }
    }
}

/// Result of one screening run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Raw model score, nominally in [0, 1]
    pub probability: f64,

    pub outcome: Outcome,

    /// Distance from the decision threshold, scaled to 0-100
    pub confidence_pct: f64,

    pub assessed_at: DateTime<Utc>,
}

impl RiskAssessment {
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        Self {
            probability,
            outcome: Outcome::from_score(probability, threshold),
            confidence_pct: confidence_pct(probability, threshold),
            assessed_at: Utc::now(),
        }
    }
}

/// `|p - t|` relative to the widest possible distance on that side of `t`.
///
/// At `t = 0.5` this is `|p - 0.5| * 200`. Scores outside [0, 1] cap at 100.
fn confidence_pct(probability: f64, threshold: f64) -> f64 {
    let span = threshold.max(1.0 - threshold);
    if span <= 0.0 || !probability.is_finite() {
        return 0.0;
    }
    ((probability - threshold).abs() / span * 100.0).min(100.0)
}
