use serde::{Deserialize, Serialize};

use super::features::FeatureVector;

/// Binary label produced by a trained session classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictedLabel {
    LowRisk,
    HighRisk,
}

impl PredictedLabel {
    pub fn label(self) -> &'static str {
        match self {
            PredictedLabel::LowRisk => "low risk",
            PredictedLabel::HighRisk => "high risk",
        }
    }
}

/// Trained model consulted alongside the rule ladder. Implementations are loaded once and
/// shared across requests, so they must be immutable after construction.
pub trait SessionClassifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<PredictedLabel, ClassifierError>;
}

/// Failure raised while consulting a classifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
    #[error("malformed model: {0}")]
    MalformedModel(String),
    #[error("feature {name} is not a finite number")]
    NonFiniteFeature { name: &'static str },
}

/// What the advisory classifier contributed to an assessment. Never alters the tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvisoryOutcome {
    NotConsulted,
    Predicted { label: PredictedLabel },
    Unavailable { reason: String },
}

impl AdvisoryOutcome {
    pub fn summary(&self) -> String {
        match self {
            AdvisoryOutcome::NotConsulted => "advisory model not consulted".to_string(),
            AdvisoryOutcome::Predicted { label } => {
                format!("advisory model predicts {}", label.label())
            }
            AdvisoryOutcome::Unavailable { reason } => {
                format!("advisory model unavailable ({reason})")
            }
        }
    }
}

/// Runs the classifier and folds any failure into [`AdvisoryOutcome::Unavailable`].
pub(crate) fn consult(
    classifier: &dyn SessionClassifier,
    features: &FeatureVector,
) -> AdvisoryOutcome {
    match classifier.predict(features) {
        Ok(label) => AdvisoryOutcome::Predicted { label },
        Err(error) => {
            tracing::warn!(%error, "advisory classifier failed; returning rule-based assessment");
            AdvisoryOutcome::Unavailable {
                reason: error.to_string(),
            }
        }
    }
}
