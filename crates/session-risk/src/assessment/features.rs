use serde::Serialize;

use super::domain::{BehaviorIndicators, RiskFactor, RiskSubScores, SessionInputs, SessionMetrics};

/// Maps behavioral flags onto their 0/1 sub-scores.
pub struct FeatureDeriver;

impl FeatureDeriver {
    pub fn derive(indicators: &BehaviorIndicators) -> RiskSubScores {
        RiskSubScores::from_indicators(indicators)
    }
}

pub const FEATURE_COUNT: usize = 10;

/// Column order the advisory model was trained on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "session_length",
    "bets_placed",
    "avg_bet_amount",
    "total_loss",
    "deposit_frequency",
    "loss_chasing_score",
    "bet_escalation_risk",
    "session_intensity",
    "deposit_stress",
    "emotional_tilt",
];

/// Engineered features handed to the advisory classifier: five raw numerics followed by
/// the five sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn from_parts(metrics: &SessionMetrics, sub_scores: &RiskSubScores) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        values[0] = metrics.session_length_minutes;
        values[1] = metrics.bets_placed;
        values[2] = metrics.avg_bet_amount;
        values[3] = metrics.total_loss;
        values[4] = metrics.deposit_frequency;
        for (offset, factor) in RiskFactor::ALL.iter().enumerate() {
            values[5 + offset] = f64::from(sub_scores.get(*factor));
        }
        Self(values)
    }

    pub fn from_inputs(inputs: &SessionInputs) -> Self {
        let sub_scores = FeatureDeriver::derive(&inputs.indicators);
        Self::from_parts(&inputs.metrics, &sub_scores)
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Index of the first non-finite feature, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.0.iter().position(|value| !value.is_finite())
    }
}
