//! Session risk assessment: indicator derivation, rule-based tiering, and the optional
//! advisory classifier seam.

mod advisory;
mod classifier;
pub mod domain;
mod features;
pub mod forest;
pub mod import;
pub mod intake;
pub mod router;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::Serialize;

pub use advisory::{AdvisoryOutcome, ClassifierError, PredictedLabel, SessionClassifier};
pub use classifier::{tier_for_score, RiskClassifier, HIGH_THRESHOLD, SEVERE_THRESHOLD};
pub use domain::{
    BehaviorIndicators, Explanation, RiskAssessment, RiskFactor, RiskSubScores, RiskTier,
    SessionInputs, SessionMetrics, NO_RISK_EXPLANATION,
};
pub use features::{FeatureDeriver, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use forest::{ForestModel, ModelLoadError};
pub use import::{ImportedSession, SessionCsvImporter, SessionImportError};
pub use intake::{IndicatorAnswer, IntakeGuard, IntakeLimits, IntakeViolation, SessionSubmission};
pub use router::{assessment_router, AssessmentState};

/// Entry point composing the rule ladder with an optional advisory classifier.
#[derive(Clone, Default)]
pub struct RiskAssessor {
    classifier: RiskClassifier,
    advisor: Option<Arc<dyn SessionClassifier>>,
}

impl RiskAssessor {
    /// Rules only; the advisory classifier is never consulted.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_advisor(advisor: Arc<dyn SessionClassifier>) -> Self {
        Self {
            classifier: RiskClassifier::new(),
            advisor: Some(advisor),
        }
    }

    pub fn has_advisor(&self) -> bool {
        self.advisor.is_some()
    }

    pub fn assess(&self, inputs: &SessionInputs) -> SessionAssessment {
        let sub_scores = FeatureDeriver::derive(&inputs.indicators);
        let assessment = self.classifier.classify(&sub_scores);

        // Reported alongside the rule outcome; never feeds the tier.
        let advisory = match &self.advisor {
            Some(advisor) => {
                let features = FeatureVector::from_parts(&inputs.metrics, &sub_scores);
                advisory::consult(advisor.as_ref(), &features)
            }
            None => AdvisoryOutcome::NotConsulted,
        };

        tracing::debug!(
            composite_score = assessment.composite_score,
            tier = assessment.tier.label(),
            advisory = %advisory.summary(),
            "session assessed"
        );

        SessionAssessment {
            sub_scores,
            assessment,
            advisory,
        }
    }
}

/// Full result of one assessment, including the sub-scores that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionAssessment {
    pub sub_scores: RiskSubScores,
    pub assessment: RiskAssessment,
    pub advisory: AdvisoryOutcome,
}

impl SessionAssessment {
    pub fn view(&self) -> AssessmentView {
        AssessmentView {
            composite_score: self.assessment.composite_score,
            tier: self.assessment.tier,
            tier_label: self.assessment.tier.label(),
            recommended_action: self.assessment.recommended_action.clone(),
            explanation: self.assessment.explanation.render(),
            reasons: self.assessment.explanation.reasons().to_vec(),
            advisory: self.advisory.clone(),
        }
    }
}

/// Flattened representation returned to API clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentView {
    pub composite_score: u8,
    pub tier: RiskTier,
    pub tier_label: &'static str,
    pub recommended_action: String,
    pub explanation: String,
    pub reasons: Vec<String>,
    pub advisory: AdvisoryOutcome,
}
