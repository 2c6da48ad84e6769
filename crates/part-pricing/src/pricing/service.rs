use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::classification::{ClassificationEngine, ClassificationError};
use super::domain::{ClassifiedRecord, RawAttributes};
use super::increment::{self, IncrementDecision, IncrementRule};
use super::mapping::map_attributes;
use super::model::{ModelError, Predictor};
use super::schema::{one_hot, reconcile, DEFAULT_SEPARATOR};
use super::sink::{PredictionLogEntry, PredictionSink};
use super::source::PartSource;

/// Service composing the part source, classification rules, price model and
/// prediction log.
pub struct PartQuoteService<S, P, L> {
    source: Arc<S>,
    predictor: Arc<P>,
    sink: Arc<L>,
    engine: Arc<ClassificationEngine>,
}

/// Priced part as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartQuote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parte: Option<String>,
    pub prediction: f64,
    pub incremento: IncrementDecision,
    pub increment_rule: IncrementRule,
    pub classified_record: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    Quoted(PartQuote),
    NoData,
}

impl<S, P, L> PartQuoteService<S, P, L>
where
    S: PartSource + 'static,
    P: Predictor + 'static,
    L: PredictionSink + 'static,
{
    pub fn new(
        source: Arc<S>,
        predictor: Arc<P>,
        sink: Arc<L>,
        engine: ClassificationEngine,
    ) -> Self {
        Self {
            source,
            predictor,
            sink,
            engine: Arc::new(engine),
        }
    }

    pub fn feature_count(&self) -> usize {
        self.predictor.feature_schema().len()
    }

    /// Looks the part up and prices it. Lookup failures and unknown parts are
    /// reported as [`QuoteOutcome::NoData`].
    pub async fn quote(&self, parte: &str) -> Result<QuoteOutcome, QuoteError> {
        let raw = match self.source.fetch(parte).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(parte, "part not found");
                return Ok(QuoteOutcome::NoData);
            }
            Err(error) => {
                warn!(parte, %error, "part lookup failed");
                return Ok(QuoteOutcome::NoData);
            }
        };

        self.evaluate(Some(parte.to_string()), &raw)
            .map(QuoteOutcome::Quoted)
    }

    /// Prices an already fetched record.
    pub fn evaluate(
        &self,
        parte: Option<String>,
        raw: &RawAttributes,
    ) -> Result<PartQuote, QuoteError> {
        let record = self.classify(raw)?;
        let parte = parte.or_else(|| record.attributes.part.clone());

        let inputs = record.model_inputs();
        let encoded = one_hot(&inputs, DEFAULT_SEPARATOR);
        let row = reconcile(&encoded, self.predictor.feature_schema());
        if !row.dropped().is_empty() {
            debug!(
                parte = parte.as_deref().unwrap_or("-"),
                dropped = ?row.dropped(),
                "levels unknown to the model were ignored"
            );
        }

        let prediction = self.predictor.predict(&row)?;
        if !prediction.is_finite() {
            return Err(ModelError::NonFinite.into());
        }
        let outcome = increment::decide(&record, prediction);
        if outcome.raw_increment.abs() >= i64::MAX as f64 {
            return Err(ModelError::OutOfRange(prediction).into());
        }

        let entry = PredictionLogEntry {
            recorded_at: Utc::now(),
            parte: parte.clone(),
            prediction,
            incremento: outcome.decision.to_string(),
            inputs: inputs
                .into_iter()
                .map(|(column, value)| (column.to_string(), value))
                .collect(),
        };
        if let Err(error) = self.sink.record(&entry) {
            warn!(%error, "failed to record prediction");
        }

        Ok(PartQuote {
            parte,
            prediction,
            incremento: outcome.decision,
            increment_rule: outcome.rule,
            classified_record: record.to_map(),
        })
    }

    /// Renames and classifies a record without pricing it.
    pub fn classify(&self, raw: &RawAttributes) -> Result<ClassifiedRecord, QuoteError> {
        let attributes = map_attributes(raw);
        Ok(self.engine.classify(attributes)?)
    }
}

/// Error raised by the quote service.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),
    #[error(transparent)]
    Model(#[from] ModelError),
}
