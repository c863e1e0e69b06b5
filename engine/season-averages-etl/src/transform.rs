//! Reshapes the raw season averages payload into a typed table.
//!
//! Records are projected onto the configured keep-list, renamed, de-duplicated, and
//! each column is assigned a warehouse type from the values it holds.

use crate::config::ColumnMapping;
use crate::error::TransformError;
use crate::models::{ColumnSchema, RawPayload, Row, ScalarValue, SeasonTable, SqlType};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Column projection, renaming and type inference over the API payload
#[derive(Debug, Clone)]
pub struct Transformer {
    columns: Vec<ColumnMapping>,
}

impl Transformer {
    pub fn new(columns: Vec<ColumnMapping>) -> Self {
        Self { columns }
    }

    /// Destination column names in output order
    pub fn target_columns(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.target.clone()).collect()
    }

    /// Build the table from the payload's `data` array.
    ///
    /// Returns `Ok(None)` when the payload has no `data` field at all.
    pub fn transform(&self, payload: &RawPayload) -> Result<Option<SeasonTable>, TransformError> {
        let Some(data) = payload.get("data") else {
            debug!("Payload has no 'data' field");
            return Ok(None);
        };

        let records = data.as_array().ok_or(TransformError::InvalidData)?;

        let mut rows = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            rows.push(self.project(index, record)?);
        }

        let fetched = rows.len();
        let rows = dedup_rows(rows);
        if rows.len() < fetched {
            debug!("Dropped {} duplicate rows", fetched - rows.len());
        }

        let columns = self.target_columns();
        let schema = infer_schema(&columns, &rows);

        Ok(Some(SeasonTable::new(columns, schema, rows)))
    }

    fn project(&self, index: usize, record: &Value) -> Result<Row, TransformError> {
        let object = record.as_object().ok_or(TransformError::InvalidRecord { index })?;

        let mut values = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = object.get(&column.source).ok_or_else(|| {
                TransformError::MissingField { field: column.source.clone(), index }
            })?;
            let scalar = ScalarValue::from_json(value).ok_or_else(|| {
                TransformError::UnsupportedValue { field: column.source.clone(), index }
            })?;
            values.push(scalar);
        }

        Ok(Row(values))
    }
}

/// Keep the first occurrence of each distinct row
fn dedup_rows(rows: Vec<Row>) -> Vec<Row> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.into_iter().filter(|row| seen.insert(row.clone())).collect()
}

/// Per column, the type of the last non-null value wins. Columns with no typed values
/// fall back to VARCHAR.
fn infer_schema(columns: &[String], rows: &[Row]) -> ColumnSchema {
    let inferred = columns
        .iter()
        .enumerate()
        .map(|(position, name)| {
            let sql_type = rows
                .iter()
                .filter_map(|row| row.values().get(position).and_then(ScalarValue::sql_type))
                .last()
                .unwrap_or(SqlType::Varchar);
            (name.clone(), sql_type)
        })
        .collect();

    ColumnSchema::new(inferred)
}
