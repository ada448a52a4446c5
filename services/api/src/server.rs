use crate::cli::ServeArgs;
use crate::infra::{assessor_from_config, AppState};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use session_risk::assessment::AssessmentState;
use session_risk::config::AppConfig;
use session_risk::error::AppError;
use session_risk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let assessor = assessor_from_config(&config.assessment);
    let advisory_enabled = assessor.has_advisor();
    let assessment_state = Arc::new(AssessmentState::new(assessor));

    let app = with_assessment_routes(assessment_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, advisory_enabled, "session risk service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
