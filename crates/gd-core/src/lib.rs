//! Core functionality for the GapMinder dashboard
//!
//! This crate provides the field catalogue, the filter state with its
//! revision tracking, lazily recomputed derived values and the control
//! definitions that the sidebar is built from.

pub mod controls;
pub mod events;
pub mod fields;
pub mod filters;
pub mod reactive;
pub mod state;

// Re-export commonly used types
pub use controls::{ControlError, ControlSet, ControlDefaults, SelectControl, RangeControl, CheckboxGroupControl, MultiSelectControl};
pub use fields::{DataField, CONTINENTS};
pub use filters::{FilterState, FilterSelection, FilterChange, FilterSubscriber, InputId, FILTER_INPUTS};
pub use reactive::Reactive;
pub use state::{AppSettings, HoveredData};
pub use data::DataSource;

pub mod data {
    use std::sync::Arc;

    /// Trait for tabular data sources
    #[async_trait::async_trait]
    pub trait DataSource: Send + Sync {
        /// Get the schema of this data source
        async fn schema(&self) -> Arc<arrow::datatypes::Schema>;

        /// Query all data
        async fn query_all(&self) -> anyhow::Result<arrow::record_batch::RecordBatch>;

        /// Get total row count
        async fn row_count(&self) -> anyhow::Result<usize>;

        /// Get the source name/path
        fn source_name(&self) -> &str;
    }
}
