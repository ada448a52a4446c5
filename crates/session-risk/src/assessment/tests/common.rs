use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::assessment::advisory::{ClassifierError, PredictedLabel, SessionClassifier};
use crate::assessment::domain::{BehaviorIndicators, SessionInputs, SessionMetrics};
use crate::assessment::features::FeatureVector;
use crate::assessment::intake::{IndicatorAnswer, SessionSubmission};
use crate::assessment::router::{assessment_router, AssessmentState};
use crate::assessment::RiskAssessor;

pub(super) fn typical_metrics() -> SessionMetrics {
    SessionMetrics {
        session_length_minutes: 60.0,
        bets_placed: 10.0,
        avg_bet_amount: 50.0,
        total_loss: 0.0,
        deposit_frequency: 1.0,
    }
}

pub(super) fn heavy_metrics() -> SessionMetrics {
    SessionMetrics {
        session_length_minutes: 355.0,
        bets_placed: 100.0,
        avg_bet_amount: 990.0,
        total_loss: 4950.0,
        deposit_frequency: 20.0,
    }
}

/// Indicators from a five-bit mask; bit 0 is chasing losses, bit 4 emotional tilt.
pub(super) fn indicators_from_mask(mask: u8) -> BehaviorIndicators {
    BehaviorIndicators {
        chasing_losses: mask & 0b00001 != 0,
        rapid_bet_increase: mask & 0b00010 != 0,
        long_session: mask & 0b00100 != 0,
        frequent_deposits: mask & 0b01000 != 0,
        emotional_tilt: mask & 0b10000 != 0,
    }
}

pub(super) fn all_indicator_sets() -> impl Iterator<Item = BehaviorIndicators> {
    (0u8..32).map(indicators_from_mask)
}

pub(super) fn session(indicators: BehaviorIndicators) -> SessionInputs {
    SessionInputs {
        metrics: typical_metrics(),
        indicators,
    }
}

pub(super) fn submission() -> SessionSubmission {
    SessionSubmission {
        session_length: 60.0,
        bets_placed: 10.0,
        avg_bet_amount: 50.0,
        total_loss: 0.0,
        deposit_frequency: 1.0,
        chasing_losses: Some(IndicatorAnswer::no()),
        rapid_bet_increase: Some(IndicatorAnswer::no()),
        long_session: Some(IndicatorAnswer::no()),
        frequent_deposits: Some(IndicatorAnswer::no()),
        emotional_tilt: Some(IndicatorAnswer::no()),
        ..SessionSubmission::default()
    }
}

pub(super) fn risky_submission() -> SessionSubmission {
    SessionSubmission {
        session_length: 240.0,
        bets_placed: 80.0,
        avg_bet_amount: 400.0,
        total_loss: 3500.0,
        deposit_frequency: 9.0,
        chasing_losses: Some(IndicatorAnswer::yes()),
        rapid_bet_increase: Some(IndicatorAnswer::yes()),
        long_session: Some(IndicatorAnswer::yes()),
        frequent_deposits: Some(IndicatorAnswer::yes()),
        emotional_tilt: Some(IndicatorAnswer::no()),
        ..SessionSubmission::default()
    }
}

/// Classifier returning a fixed label and counting how often it was asked.
#[derive(Default)]
pub(super) struct FixedClassifier {
    pub(super) label: Option<PredictedLabel>,
    pub(super) calls: AtomicUsize,
}

impl FixedClassifier {
    pub(super) fn predicting(label: PredictedLabel) -> Self {
        Self {
            label: Some(label),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SessionClassifier for FixedClassifier {
    fn predict(&self, _features: &FeatureVector) -> Result<PredictedLabel, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.label
            .ok_or_else(|| ClassifierError::Unavailable("no label configured".to_string()))
    }
}

/// Classifier that always fails, standing in for a missing model service.
pub(super) struct OfflineClassifier;

impl SessionClassifier for OfflineClassifier {
    fn predict(&self, _features: &FeatureVector) -> Result<PredictedLabel, ClassifierError> {
        Err(ClassifierError::Unavailable("model service offline".to_string()))
    }
}

/// Records the last feature vector it was handed.
#[derive(Default)]
pub(super) struct RecordingClassifier {
    pub(super) seen: std::sync::Mutex<Vec<FeatureVector>>,
}

impl SessionClassifier for RecordingClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<PredictedLabel, ClassifierError> {
        self.seen
            .lock()
            .expect("recording mutex poisoned")
            .push(*features);
        Ok(PredictedLabel::LowRisk)
    }
}

pub(super) fn rules_only_router() -> axum::Router {
    assessment_router(Arc::new(AssessmentState::new(RiskAssessor::new())))
}

pub(super) fn advisory_router(classifier: Arc<dyn SessionClassifier>) -> axum::Router {
    assessment_router(Arc::new(AssessmentState::new(RiskAssessor::with_advisor(
        classifier,
    ))))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
