//! The immutable base table

use arrow::array::{Array, Int64Array, StringArray};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use gd_core::fields::columns;
use indexmap::IndexSet;

use crate::schema::validate_schema;
use crate::DataError;

/// The complete dataset, loaded once and never mutated
#[derive(Debug, Clone)]
pub struct BaseTable {
    batch: RecordBatch,
    source_name: String,
}

impl BaseTable {
    /// Wrap a batch after checking it has the GapMinder schema
    pub fn new(batch: RecordBatch, source_name: impl Into<String>) -> Result<Self, DataError> {
        validate_schema(&batch.schema())?;
        Ok(Self {
            batch,
            source_name: source_name.into(),
        })
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Distinct non-null values of a string column in first-appearance order
    pub fn distinct_strings(&self, column: &str) -> Result<Vec<String>, DataError> {
        let array = string_column(&self.batch, column)?;
        let values: IndexSet<&str> = array.iter().flatten().collect();
        Ok(values.into_iter().map(str::to_string).collect())
    }

    /// Countries in first-appearance order
    pub fn countries(&self) -> Result<Vec<String>, DataError> {
        self.distinct_strings(columns::COUNTRY)
    }

    /// Smallest and largest year, or `None` for an empty table
    pub fn year_bounds(&self) -> Result<Option<(i64, i64)>, DataError> {
        let years = int_column(&self.batch, columns::YEAR)?;
        Ok(arrow::compute::min(years).zip(arrow::compute::max(years)))
    }
}

/// Downcast a named column to a string array
pub fn string_column<'a>(batch: &'a RecordBatch, column: &str) -> Result<&'a StringArray, DataError> {
    let array = batch
        .column_by_name(column)
        .ok_or_else(|| DataError::MissingColumn(column.to_string()))?;
    array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| DataError::ColumnType {
            column: column.to_string(),
            expected: "Utf8".to_string(),
            found: array.data_type().to_string(),
        })
}

/// Downcast a named column to an Int64 array
pub fn int_column<'a>(batch: &'a RecordBatch, column: &str) -> Result<&'a Int64Array, DataError> {
    let array = batch
        .column_by_name(column)
        .ok_or_else(|| DataError::MissingColumn(column.to_string()))?;
    array
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| DataError::ColumnType {
            column: column.to_string(),
            expected: "Int64".to_string(),
            found: array.data_type().to_string(),
        })
}
