//! Part pricing: attribute mapping, rule-based classification, alignment with a
//! trained model and the markup decision on top of its prediction.

pub mod classification;
pub mod dataset;
pub mod domain;
pub mod increment;
pub mod mapping;
pub mod model;
pub mod router;
pub mod schema;
pub mod service;
pub mod sink;
pub mod source;

#[cfg(test)]
mod tests;

pub use classification::{
    CatalogError, ClassificationEngine, ClassificationError, ClassificationPolicy, DieCatalog,
    RulesVariant,
};
pub use dataset::{encode_training_frame, DatasetError, EncodeOptions, EncodeSummary};
pub use domain::{ClassifiedRecord, LabelStyle, PartAttributes, RawAttributes};
pub use increment::{IncrementDecision, IncrementOutcome, IncrementRule};
pub use mapping::map_attributes;
pub use model::{LinearModel, ModelError, Predictor};
pub use router::pricing_router;
pub use schema::{ModelFeatureSchema, ReconciledVector, SchemaMismatchError};
pub use service::{PartQuote, PartQuoteService, QuoteError, QuoteOutcome};
pub use sink::{PredictionLogEntry, PredictionLogger, PredictionSink, SinkError};
pub use source::{ErpPartClient, ExternalCallError, PartSource};
