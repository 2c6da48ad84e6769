//! Alignment of a classified record with the column contract of a trained model.
//!
//! Training frames were one-hot encoded with the first level of every column
//! dropped. At prediction time nothing is dropped: every present value becomes
//! an active indicator, and alignment against the model's column list decides
//! what survives. An indicator for a dropped (reference) level is therefore not
//! in the schema and simply disappears, which reproduces the training encoding.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

/// Separator between column name and level in indicator names (`Impreso_SI`).
pub const DEFAULT_SEPARATOR: &str = "_";

/// Ordered feature columns a model was fit on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFeatureSchema {
    columns: Vec<String>,
}

impl ModelFeatureSchema {
    pub fn new<I, S>(columns: I) -> Result<Self, SchemaMismatchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(SchemaMismatchError::Empty);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(SchemaMismatchError::DuplicateColumn(column.clone()));
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaMismatchError {
    #[error("model feature schema is empty or unavailable")]
    Empty,
    #[error("model feature schema lists column '{0}' more than once")]
    DuplicateColumn(String),
}

/// A single row aligned to a [`ModelFeatureSchema`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledVector {
    columns: Vec<String>,
    values: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dropped: Vec<String>,
}

impl ReconciledVector {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Indicators the record produced that the model has never seen.
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    pub fn active_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .zip(&self.values)
            .filter(|(_, value)| **value != 0.0)
            .map(|(column, _)| column.as_str())
    }
}

/// Indicator columns for one row: every present value becomes `column<sep>value = 1`.
pub fn one_hot(row: &[(&str, Option<String>)], separator: &str) -> BTreeMap<String, f64> {
    row.iter()
        .filter_map(|(column, value)| {
            value
                .as_ref()
                .map(|value| (format!("{column}{separator}{value}"), 1.0))
        })
        .collect()
}

/// Projects encoded columns onto `schema`: missing columns become 0, unknown
/// columns are dropped, order follows the schema exactly.
pub fn reconcile(encoded: &BTreeMap<String, f64>, schema: &ModelFeatureSchema) -> ReconciledVector {
    let values = schema
        .columns()
        .iter()
        .map(|column| encoded.get(column).copied().unwrap_or(0.0))
        .collect();

    let known: HashSet<&str> = schema.columns().iter().map(String::as_str).collect();
    let dropped = encoded
        .keys()
        .filter(|column| !known.contains(column.as_str()))
        .cloned()
        .collect();

    ReconciledVector {
        columns: schema.columns().to_vec(),
        values,
        dropped,
    }
}
