use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use part_pricing::config::AppConfig;
use part_pricing::error::AppError;
use part_pricing::pricing::{
    ClassificationEngine, DieCatalog, ExternalCallError, LinearModel, PartQuoteService,
    PartSource, PredictionLogger, Predictor, RawAttributes,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stand-in source for commands that never look parts up.
pub(crate) struct OfflineSource;

#[async_trait]
impl PartSource for OfflineSource {
    async fn fetch(&self, _parte: &str) -> Result<Option<RawAttributes>, ExternalCallError> {
        Err(ExternalCallError::NotConfigured)
    }
}

pub(crate) fn classification_engine(config: &AppConfig) -> Result<ClassificationEngine, AppError> {
    let catalog = match &config.rules.die_catalog_path {
        Some(path) => DieCatalog::from_path(path)?,
        None => DieCatalog::standard(),
    };
    Ok(ClassificationEngine::new(
        config.rules.variant.into(),
        Arc::new(catalog),
    ))
}

pub(crate) fn prediction_logger(config: &AppConfig) -> Result<PredictionLogger, AppError> {
    match &config.telemetry.prediction_log {
        Some(path) => Ok(PredictionLogger::with_file(path)?),
        None => Ok(PredictionLogger::tracing_only()),
    }
}

pub(crate) fn quote_service<S>(
    config: &AppConfig,
    source: S,
) -> Result<PartQuoteService<S, LinearModel, PredictionLogger>, AppError>
where
    S: PartSource + 'static,
{
    let engine = classification_engine(config)?;
    let model = LinearModel::from_path(&config.model.artifact_path)?;
    let logger = prediction_logger(config)?;

    info!(
        rules = config.rules.variant.label(),
        features = model.feature_schema().len(),
        artifact = %config.model.artifact_path.display(),
        "price model loaded"
    );

    Ok(PartQuoteService::new(
        Arc::new(source),
        Arc::new(model),
        Arc::new(logger),
        engine,
    ))
}
