use crate::config::ConfigError;
use crate::pricing::{
    CatalogError, DatasetError, ExternalCallError, ModelError, QuoteError, SinkError,
};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Catalog(CatalogError),
    Model(ModelError),
    Source(ExternalCallError),
    Quote(QuoteError),
    Dataset(DatasetError),
    Sink(SinkError),
    Input(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Catalog(err) => write!(f, "die catalog error: {}", err),
            AppError::Model(err) => write!(f, "model error: {}", err),
            AppError::Source(err) => write!(f, "part source error: {}", err),
            AppError::Quote(err) => write!(f, "quote error: {}", err),
            AppError::Dataset(err) => write!(f, "dataset error: {}", err),
            AppError::Sink(err) => write!(f, "prediction log error: {}", err),
            AppError::Input(err) => write!(f, "invalid input: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Model(err) => Some(err),
            AppError::Source(err) => Some(err),
            AppError::Quote(err) => Some(err),
            AppError::Dataset(err) => Some(err),
            AppError::Sink(err) => Some(err),
            AppError::Input(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Quote(QuoteError::Classification(_)) | AppError::Input(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Source(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Catalog(_)
            | AppError::Model(_)
            | AppError::Quote(_)
            | AppError::Dataset(_)
            | AppError::Sink(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<ModelError> for AppError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

impl From<ExternalCallError> for AppError {
    fn from(value: ExternalCallError) -> Self {
        Self::Source(value)
    }
}

impl From<QuoteError> for AppError {
    fn from(value: QuoteError) -> Self {
        Self::Quote(value)
    }
}

impl From<DatasetError> for AppError {
    fn from(value: DatasetError) -> Self {
        Self::Dataset(value)
    }
}

impl From<SinkError> for AppError {
    fn from(value: SinkError) -> Self {
        Self::Sink(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Input(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::ClassificationError;

    #[test]
    fn classification_failures_are_unprocessable() {
        let error = AppError::from(QuoteError::Classification(
            ClassificationError::MissingField { field: "Ancho" },
        ));
        assert_eq!(error.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn source_failures_are_bad_gateway() {
        let response = AppError::from(ExternalCallError::Status(503)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn model_failures_are_internal_errors() {
        let response = AppError::from(ModelError::NonFinite).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
