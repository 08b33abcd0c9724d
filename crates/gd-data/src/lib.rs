//! Data loading and the filtered-view pipeline for the GapMinder dashboard

pub mod config;
pub mod pipeline;
pub mod schema;
pub mod sources;
pub mod table;

use arrow::error::ArrowError;
use tokio::task::JoinError;
use thiserror::Error;

// Re-exports
pub use config::{DashboardConfig, ChartDefaults, ConfigOverrides};
pub use pipeline::{filter_table, FilteredTable, FilteredView};
pub use sources::{CsvSource, WorldBoundaries};
pub use table::BaseTable;

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Column '{column}' has type {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: String,
        found: String,
    },

    #[error("Invalid value '{value}' in column '{column}' at line {line}")]
    InvalidValue {
        column: String,
        value: String,
        line: u64,
    },

    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<geojson::Error> for DataError {
    fn from(error: geojson::Error) -> Self {
        DataError::GeoJson(error.to_string())
    }
}
