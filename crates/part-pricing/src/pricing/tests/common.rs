use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::response::Response;
use serde_json::{json, Value};

use crate::pricing::classification::{ClassificationEngine, RulesVariant};
use crate::pricing::domain::RawAttributes;
use crate::pricing::model::{ModelError, Predictor};
use crate::pricing::schema::{ModelFeatureSchema, ReconciledVector};
use crate::pricing::service::PartQuoteService;
use crate::pricing::sink::{PredictionLogEntry, PredictionSink, SinkError};
use crate::pricing::source::{ExternalCallError, PartSource};

pub(super) const KNOWN_PART: &str = "PT-100";

pub(super) fn flow_pack_record() -> RawAttributes {
    let value = json!({
        "PartPlant_PartNum": KNOWN_PART,
        "Part_ShortChar02": "BOLSA",
        "Part_ShortChar04": "PET/PE",
        "Part_ShortChar03": "FLOW PACK",
        "Part_ShortChar10": "TRASLAPE",
        "UD02_ShortChar05": "VERTICAL",
        "Part_Number01": 180.0,
        "Part_Number02": 300.0,
        "Part_Number03": 70,
        "Part_Character07": null,
        "Part_UserChar4": "TR001",
        "Part_ShortChar01": "FLEXO 6 TINTAS",
        "RowMod": ""
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!("literal is an object"),
    }
}

pub(super) fn schema() -> ModelFeatureSchema {
    ModelFeatureSchema::new([
        "TipoProducto_ROLLO",
        "TipoBolsa_FLOW PACK",
        "GrupoFormato_Grupo 2",
        "Impreso_SI",
        "Calibre_>100",
        "GradoTroquel_GRADO ALTO",
    ])
    .expect("valid schema")
}

#[derive(Default)]
pub(super) struct MemorySource {
    parts: HashMap<String, RawAttributes>,
}

impl MemorySource {
    pub(super) fn with_part(parte: &str, record: RawAttributes) -> Self {
        let mut parts = HashMap::new();
        parts.insert(parte.to_string(), record);
        Self { parts }
    }
}

#[async_trait]
impl PartSource for MemorySource {
    async fn fetch(&self, parte: &str) -> Result<Option<RawAttributes>, ExternalCallError> {
        Ok(self.parts.get(parte).cloned())
    }
}

pub(super) struct UnavailableSource;

#[async_trait]
impl PartSource for UnavailableSource {
    async fn fetch(&self, _parte: &str) -> Result<Option<RawAttributes>, ExternalCallError> {
        Err(ExternalCallError::Status(503))
    }
}

pub(super) struct FixedPredictor {
    schema: ModelFeatureSchema,
    prediction: f64,
    seen: Mutex<Vec<ReconciledVector>>,
}

impl FixedPredictor {
    pub(super) fn new(prediction: f64) -> Self {
        Self {
            schema: schema(),
            prediction,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn seen(&self) -> Vec<ReconciledVector> {
        self.seen.lock().expect("lock").clone()
    }
}

impl Predictor for FixedPredictor {
    fn feature_schema(&self) -> &ModelFeatureSchema {
        &self.schema
    }

    fn predict(&self, row: &ReconciledVector) -> Result<f64, ModelError> {
        self.seen.lock().expect("lock").push(row.clone());
        Ok(self.prediction)
    }
}

#[derive(Default)]
pub(super) struct MemorySink {
    entries: Mutex<Vec<PredictionLogEntry>>,
}

impl MemorySink {
    pub(super) fn entries(&self) -> Vec<PredictionLogEntry> {
        self.entries.lock().expect("lock").clone()
    }
}

impl PredictionSink for MemorySink {
    fn record(&self, entry: &PredictionLogEntry) -> Result<(), SinkError> {
        self.entries.lock().expect("lock").push(entry.clone());
        Ok(())
    }
}

pub(super) struct BrokenSink;

impl PredictionSink for BrokenSink {
    fn record(&self, _entry: &PredictionLogEntry) -> Result<(), SinkError> {
        Err(SinkError::Poisoned)
    }
}

pub(super) fn service_with<S, L>(
    source: S,
    prediction: f64,
    sink: Arc<L>,
) -> (PartQuoteService<S, FixedPredictor, L>, Arc<FixedPredictor>)
where
    S: PartSource + 'static,
    L: PredictionSink + 'static,
{
    let predictor = Arc::new(FixedPredictor::new(prediction));
    let service = PartQuoteService::new(
        Arc::new(source),
        predictor.clone(),
        sink,
        ClassificationEngine::for_variant(RulesVariant::Current),
    );
    (service, predictor)
}

pub(super) async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
