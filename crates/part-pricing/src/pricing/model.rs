use super::schema::{ModelFeatureSchema, ReconciledVector, SchemaMismatchError};
use serde::Deserialize;
use std::path::Path;

/// Trained price model seen from the service: a fixed input schema and a scalar output.
pub trait Predictor: Send + Sync {
    fn feature_schema(&self) -> &ModelFeatureSchema;
    fn predict(&self, row: &ReconciledVector) -> Result<f64, ModelError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),
    #[error("expected {expected} values, got {found}")]
    Shape { expected: usize, found: usize },
    #[error("model produced a non-finite prediction")]
    NonFinite,
    #[error("model prediction {0} is outside the priceable range")]
    OutOfRange(f64),
}

#[derive(Debug, Deserialize)]
struct LinearArtifact {
    feature_names: Vec<String>,
    #[serde(default)]
    intercept: f64,
    coefficients: Vec<f64>,
}

/// Linear model exported as JSON: `{"feature_names": [...], "intercept": .., "coefficients": [...]}`.
#[derive(Debug, Clone)]
pub struct LinearModel {
    schema: ModelFeatureSchema,
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn new(
        schema: ModelFeatureSchema,
        intercept: f64,
        coefficients: Vec<f64>,
    ) -> Result<Self, ModelError> {
        if coefficients.len() != schema.len() {
            return Err(ModelError::Shape {
                expected: schema.len(),
                found: coefficients.len(),
            });
        }
        Ok(Self {
            schema,
            intercept,
            coefficients,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let artifact: LinearArtifact = serde_json::from_str(raw)?;
        let schema = ModelFeatureSchema::new(artifact.feature_names)?;
        Self::new(schema, artifact.intercept, artifact.coefficients)
    }
}

impl Predictor for LinearModel {
    fn feature_schema(&self) -> &ModelFeatureSchema {
        &self.schema
    }

    fn predict(&self, row: &ReconciledVector) -> Result<f64, ModelError> {
        if row.len() != self.coefficients.len() {
            return Err(ModelError::Shape {
                expected: self.coefficients.len(),
                found: row.len(),
            });
        }

        let value = self.intercept
            + row
                .values()
                .iter()
                .zip(&self.coefficients)
                .map(|(x, beta)| x * beta)
                .sum::<f64>();

        if value.is_finite() {
            Ok(value)
        } else {
            Err(ModelError::NonFinite)
        }
    }
}
