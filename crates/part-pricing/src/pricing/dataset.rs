//! Offline preparation of training exports.
//!
//! Mirrors how model artifacts are produced: the same categorical columns the
//! service classifies are one-hot encoded, normally with the first level of
//! each column dropped. Comparing [`EncodeSummary::feature_columns`] with a
//! model's schema shows which levels act as references.

use super::domain::MODEL_INPUT_COLUMNS;
use super::schema::DEFAULT_SEPARATOR;
use std::collections::BTreeSet;
use std::io::{Read, Write};
use tracing::info;

/// Column the models are fit against.
pub const DEFAULT_TARGET_COLUMN: &str = "PorcentajeCumplimiento";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    pub categorical_columns: Vec<String>,
    pub drop_first: bool,
    pub separator: String,
    pub target_column: Option<String>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            categorical_columns: MODEL_INPUT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            drop_first: true,
            separator: DEFAULT_SEPARATOR.to_string(),
            target_column: Some(DEFAULT_TARGET_COLUMN.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSummary {
    pub rows: usize,
    /// Output columns minus the target, in output order.
    pub feature_columns: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to process CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write encoded frame: {0}")]
    Io(#[from] std::io::Error),
    #[error("column '{0}' not found in input header")]
    MissingColumn(String),
}

struct CategoricalColumn {
    name: String,
    index: usize,
    levels: Vec<String>,
}

/// Reads a CSV export, one-hot encodes the categorical columns and writes the
/// encoded frame. Non-categorical columns come first in their original order,
/// then one indicator per kept level. Empty cells activate no indicator.
pub fn encode_training_frame<R: Read, W: Write>(
    reader: R,
    writer: W,
    options: &EncodeOptions,
) -> Result<EncodeSummary, DatasetError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let records = reader.records().collect::<Result<Vec<_>, _>>()?;

    let mut categorical = Vec::with_capacity(options.categorical_columns.len());
    for name in &options.categorical_columns {
        let index = headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| DatasetError::MissingColumn(name.clone()))?;

        let observed: BTreeSet<&str> = records
            .iter()
            .filter_map(|record| record.get(index))
            .filter(|cell| !cell.is_empty())
            .collect();
        let skip = usize::from(options.drop_first);
        let levels = observed.into_iter().skip(skip).map(str::to_string).collect();

        categorical.push(CategoricalColumn {
            name: name.clone(),
            index,
            levels,
        });
    }

    let passthrough: Vec<usize> = (0..headers.len())
        .filter(|index| !categorical.iter().any(|column| column.index == *index))
        .collect();

    let mut output_header: Vec<String> = passthrough
        .iter()
        .map(|index| headers[*index].to_string())
        .collect();
    for column in &categorical {
        for level in &column.levels {
            output_header.push(format!("{}{}{}", column.name, options.separator, level));
        }
    }

    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(&output_header)?;
    for record in &records {
        let mut row: Vec<&str> = passthrough
            .iter()
            .map(|index| record.get(*index).unwrap_or(""))
            .collect();
        for column in &categorical {
            let cell = record.get(column.index).unwrap_or("");
            row.extend(
                column
                    .levels
                    .iter()
                    .map(|level| if level == cell { "1" } else { "0" }),
            );
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;

    let feature_columns: Vec<String> = output_header
        .into_iter()
        .filter(|column| Some(column) != options.target_column.as_ref())
        .collect();

    info!(
        rows = records.len(),
        features = feature_columns.len(),
        drop_first = options.drop_first,
        "training frame encoded"
    );

    Ok(EncodeSummary {
        rows: records.len(),
        feature_columns,
    })
}
