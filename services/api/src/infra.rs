use metrics_exporter_prometheus::PrometheusHandle;
use session_risk::assessment::{ForestModel, ModelLoadError, RiskAssessor, SessionClassifier};
use session_risk::config::{AppConfig, AssessmentConfig};
use session_risk::error::AppError;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn load_advisor(path: &Path) -> Result<Arc<dyn SessionClassifier>, ModelLoadError> {
    let model = ForestModel::from_path(path)?;
    info!(path = %path.display(), trees = model.tree_count(), "advisory model loaded");
    Ok(Arc::new(model))
}

/// Builds the assessor from configuration. A model that fails to load leaves the service
/// running on rules alone.
pub(crate) fn assessor_from_config(config: &AssessmentConfig) -> RiskAssessor {
    let Some(path) = config.advisory_model_path() else {
        info!(mode = ?config.classifier_mode, "advisory model not configured; using rules only");
        return RiskAssessor::new();
    };

    match load_advisor(path) {
        Ok(advisor) => RiskAssessor::with_advisor(advisor),
        Err(error) => {
            warn!(path = %path.display(), %error, "advisory model unavailable; using rules only");
            RiskAssessor::new()
        }
    }
}

/// An explicit `--model` must load; otherwise fall back to the configured model.
pub(crate) fn resolve_assessor(model: Option<PathBuf>) -> Result<RiskAssessor, AppError> {
    match model {
        Some(path) => Ok(RiskAssessor::with_advisor(load_advisor(&path)?)),
        None => {
            let config = AppConfig::load()?;
            Ok(assessor_from_config(&config.assessment))
        }
    }
}
