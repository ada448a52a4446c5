use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use session_risk::assessment::{
    assessment_router, AssessmentState, AssessmentView, SessionCsvImporter,
};
use session_risk::error::AppError;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct BatchAssessmentRequest {
    pub(crate) sessions_csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchAssessmentResponse {
    pub(crate) sessions: Vec<BatchAssessmentEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchAssessmentEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) session_id: Option<String>,
    #[serde(flatten)]
    pub(crate) assessment: AssessmentView,
}

pub(crate) fn with_assessment_routes(state: Arc<AssessmentState>) -> axum::Router {
    assessment_router(state.clone())
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/sessions/assess/batch",
            axum::routing::post(batch_assessment_endpoint),
        )
        .layer(Extension(state))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn batch_assessment_endpoint(
    Extension(state): Extension<Arc<AssessmentState>>,
    Json(payload): Json<BatchAssessmentRequest>,
) -> Result<Json<BatchAssessmentResponse>, AppError> {
    let importer = SessionCsvImporter::new(state.guard.clone());
    let imported = importer.import_reader(Cursor::new(payload.sessions_csv.into_bytes()))?;

    let sessions = imported
        .into_iter()
        .map(|session| BatchAssessmentEntry {
            assessment: state.assessor.assess(&session.inputs).view(),
            session_id: session.session_id,
        })
        .collect();

    Ok(Json(BatchAssessmentResponse { sessions }))
}
