use super::domain::{Explanation, RiskAssessment, RiskSubScores, RiskTier};

/// Composite score at which a session becomes [`RiskTier::Severe`]. Five binary sub-scores
/// top out at 5, so this rung only matters once more factors are added.
pub const SEVERE_THRESHOLD: u8 = 6;

/// Composite score at which a session becomes [`RiskTier::High`].
pub const HIGH_THRESHOLD: u8 = 4;

/// Stateless rule ladder turning sub-scores into a tier, action, and explanation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskClassifier;

impl RiskClassifier {
    pub const fn new() -> Self {
        Self
    }

    pub fn classify(&self, sub_scores: &RiskSubScores) -> RiskAssessment {
        let composite_score = sub_scores.composite();
        let tier = tier_for_score(composite_score);

        RiskAssessment {
            composite_score,
            tier,
            recommended_action: tier.recommended_action().to_string(),
            explanation: Explanation::from_sub_scores(sub_scores),
        }
    }
}

/// Checked high to low; the first rung that matches wins.
pub fn tier_for_score(score: u8) -> RiskTier {
    if score >= SEVERE_THRESHOLD {
        RiskTier::Severe
    } else if score >= HIGH_THRESHOLD {
        RiskTier::High
    } else {
        RiskTier::Low
    }
}
