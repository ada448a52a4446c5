use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::intake::{IntakeGuard, SessionSubmission};
use super::RiskAssessor;

/// Shared handler state: the intake guard in front of the assessor.
#[derive(Clone)]
pub struct AssessmentState {
    pub guard: IntakeGuard,
    pub assessor: RiskAssessor,
}

impl AssessmentState {
    pub fn new(assessor: RiskAssessor) -> Self {
        Self {
            guard: IntakeGuard::default(),
            assessor,
        }
    }
}

/// Router builder exposing the single-session assessment endpoint.
pub fn assessment_router(state: Arc<AssessmentState>) -> Router {
    Router::new()
        .route("/api/v1/sessions/assess", post(assess_handler))
        .with_state(state)
}

pub(crate) async fn assess_handler(
    State(state): State<Arc<AssessmentState>>,
    payload: Result<axum::Json<SessionSubmission>, JsonRejection>,
) -> Response {
    let submission = match payload {
        Ok(axum::Json(submission)) => submission,
        Err(rejection) => return error_response(rejection.status(), rejection.body_text()),
    };

    match state.guard.session_from_submission(&submission) {
        Ok(inputs) => {
            let view = state.assessor.assess(&inputs).view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(violation) => error_response(StatusCode::UNPROCESSABLE_ENTITY, violation.to_string()),
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}
