use std::sync::Arc;

use super::common::*;
use crate::assessment::advisory::{AdvisoryOutcome, PredictedLabel, SessionClassifier};
use crate::assessment::domain::RiskTier;
use crate::assessment::forest::{DecisionTree, ForestModel, TreeNode};
use crate::assessment::RiskAssessor;

#[test]
fn rules_only_assessor_never_consults_a_model() {
    let outcome = RiskAssessor::new().assess(&session(indicators_from_mask(0b01111)));

    assert_eq!(outcome.advisory, AdvisoryOutcome::NotConsulted);
    assert_eq!(outcome.assessment.tier, RiskTier::High);
}

#[test]
fn advisory_prediction_is_reported_but_does_not_move_the_tier() {
    let classifier = Arc::new(FixedClassifier::predicting(PredictedLabel::HighRisk));
    let assessor = RiskAssessor::with_advisor(classifier.clone());

    let outcome = assessor.assess(&session(indicators_from_mask(0b00000)));

    assert_eq!(
        outcome.advisory,
        AdvisoryOutcome::Predicted {
            label: PredictedLabel::HighRisk
        }
    );
    assert_eq!(outcome.assessment.tier, RiskTier::Low);
    assert_eq!(outcome.assessment.recommended_action, "No action required.");
    assert_eq!(classifier.calls(), 1);
}

#[test]
fn classifier_failure_degrades_to_rule_outcome() {
    let with_failure = RiskAssessor::with_advisor(Arc::new(OfflineClassifier));
    let rules_only = RiskAssessor::new();

    for indicators in all_indicator_sets() {
        let inputs = session(indicators);
        let degraded = with_failure.assess(&inputs);

        assert_eq!(degraded.assessment, rules_only.assess(&inputs).assessment);
        match &degraded.advisory {
            AdvisoryOutcome::Unavailable { reason } => {
                assert!(reason.contains("model service offline"));
            }
            other => panic!("expected unavailable advisory, got {other:?}"),
        }
    }
}

#[test]
fn advisor_receives_metrics_and_sub_scores_in_order() {
    let classifier = Arc::new(RecordingClassifier::default());
    let assessor = RiskAssessor::with_advisor(classifier.clone());
    let mut inputs = session(indicators_from_mask(0b10001));
    inputs.metrics = heavy_metrics();

    assessor.assess(&inputs);

    let seen = classifier.seen.lock().expect("recording mutex poisoned");
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].values(),
        &[355.0, 100.0, 990.0, 4950.0, 20.0, 1.0, 0.0, 0.0, 0.0, 1.0]
    );
}

#[test]
fn shared_advisor_serves_concurrent_callers() {
    let classifier = Arc::new(FixedClassifier::predicting(PredictedLabel::LowRisk));
    let assessor = Arc::new(RiskAssessor::with_advisor(classifier.clone()));

    let handles: Vec<_> = (0u8..32)
        .map(|mask| {
            let assessor = Arc::clone(&assessor);
            std::thread::spawn(move || assessor.assess(&session(indicators_from_mask(mask))))
        })
        .collect();

    for handle in handles {
        let outcome = handle.join().expect("assessment thread panicked");
        assert!(outcome.assessment.tier <= RiskTier::High);
    }
    assert_eq!(classifier.calls(), 32);
}

#[test]
fn forest_model_plugs_in_as_advisor() {
    // Loss above 2500 or four-plus flags reads as high risk.
    let model = ForestModel::new(vec![
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 3,
                    threshold: 2500.0,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    high_risk_probability: 0.1,
                },
                TreeNode::Leaf {
                    high_risk_probability: 0.8,
                },
            ],
        },
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 9,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    high_risk_probability: 0.2,
                },
                TreeNode::Leaf {
                    high_risk_probability: 0.7,
                },
            ],
        },
    ])
    .expect("model is valid");
    let advisor: Arc<dyn SessionClassifier> = Arc::new(model);
    let assessor = RiskAssessor::with_advisor(advisor);

    let calm = assessor.assess(&session(indicators_from_mask(0)));
    assert_eq!(
        calm.advisory,
        AdvisoryOutcome::Predicted {
            label: PredictedLabel::LowRisk
        }
    );

    let mut tilted = session(indicators_from_mask(0b10000));
    tilted.metrics = heavy_metrics();
    let outcome = assessor.assess(&tilted);
    assert_eq!(
        outcome.advisory,
        AdvisoryOutcome::Predicted {
            label: PredictedLabel::HighRisk
        }
    );
    assert_eq!(outcome.assessment.tier, RiskTier::Low);
}

#[test]
fn non_finite_metrics_surface_as_unavailable_advice() {
    let model = ForestModel::new(vec![DecisionTree {
        nodes: vec![TreeNode::Leaf {
            high_risk_probability: 0.9,
        }],
    }])
    .expect("model is valid");
    let assessor = RiskAssessor::with_advisor(Arc::new(model));
    let mut inputs = session(indicators_from_mask(0b00011));
    inputs.metrics.avg_bet_amount = f64::INFINITY;

    let outcome = assessor.assess(&inputs);

    assert_eq!(outcome.assessment.composite_score, 2);
    assert!(matches!(
        outcome.advisory,
        AdvisoryOutcome::Unavailable { ref reason } if reason.contains("avg_bet_amount")
    ));
}

#[test]
fn advisory_summary_describes_outcome() {
    assert_eq!(
        AdvisoryOutcome::NotConsulted.summary(),
        "advisory model not consulted"
    );
    assert_eq!(
        AdvisoryOutcome::Predicted {
            label: PredictedLabel::HighRisk
        }
        .summary(),
        "advisory model predicts high risk"
    );
}
