use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// One prediction as it is written to the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionLogEntry {
    pub recorded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parte: Option<String>,
    pub prediction: f64,
    pub incremento: String,
    pub inputs: BTreeMap<String, Option<String>>,
}

impl PredictionLogEntry {
    pub fn prediction_display(&self) -> String {
        format!("{:.2}", self.prediction)
    }
}

/// Destination for prediction records. Failures never abort a quote.
pub trait PredictionSink: Send + Sync {
    fn record(&self, entry: &PredictionLogEntry) -> Result<(), SinkError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("prediction log unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("prediction log entry could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("prediction log lock poisoned")]
    Poisoned,
}

/// Emits every prediction as a tracing event and optionally appends it as a
/// JSON line to a file.
#[derive(Debug, Default)]
pub struct PredictionLogger {
    file: Option<Mutex<File>>,
}

impl PredictionLogger {
    pub fn tracing_only() -> Self {
        Self { file: None }
    }

    pub fn with_file<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Some(Mutex::new(file)),
        })
    }
}

impl PredictionSink for PredictionLogger {
    fn record(&self, entry: &PredictionLogEntry) -> Result<(), SinkError> {
        info!(
            parte = entry.parte.as_deref().unwrap_or("-"),
            prediction = %entry.prediction_display(),
            incremento = %entry.incremento,
            inputs = ?entry.inputs,
            "prediction recorded"
        );

        if let Some(file) = &self.file {
            let mut line = serde_json::to_vec(entry)?;
            line.push(b'\n');
            let mut guard = file.lock().map_err(|_| SinkError::Poisoned)?;
            guard.write_all(&line)?;
        }
        Ok(())
    }
}
