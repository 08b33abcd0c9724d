//! Filtered-view pipeline
//!
//! [`filter_table`] is the pure row selection. [`FilteredView`] wraps it in a
//! [`Reactive`] cell that only recomputes after the continent, country or
//! year input changed.

use std::sync::Arc;

use arrow::array::BooleanArray;
use arrow::compute::filter_record_batch;
use arrow::record_batch::RecordBatch;
use gd_core::fields::columns;
use gd_core::{FilterSelection, FilterState, Reactive, FILTER_INPUTS};
use tracing::debug;

use crate::table::{int_column, string_column, BaseTable};
use crate::DataError;

/// Rows of the base table matching a filter selection
#[derive(Debug, Clone)]
pub struct FilteredTable {
    batch: RecordBatch,
    base_rows: usize,
}

impl FilteredTable {
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Row count of the table this one was filtered from
    pub fn base_rows(&self) -> usize {
        self.base_rows
    }
}

/// Restrict `table` to rows whose continent and country are selected and
/// whose year lies within the inclusive range. Row order is preserved and
/// rows with a null key never match.
pub fn filter_table(table: &BaseTable, selection: &FilterSelection) -> Result<FilteredTable, DataError> {
    let batch = table.batch();
    let continents = string_column(batch, columns::CONTINENT)?;
    let countries = string_column(batch, columns::COUNTRY)?;
    let years = int_column(batch, columns::YEAR)?;

    let mask: BooleanArray = continents
        .iter()
        .zip(countries.iter())
        .zip(years.iter())
        .map(|((continent, country), year)| match (continent, country, year) {
            (Some(continent), Some(country), Some(year)) => Some(selection.matches(continent, country, year)),
            _ => Some(false),
        })
        .collect();

    let filtered = filter_record_batch(batch, &mask)?;
    debug!("Filtered {} of {} rows", filtered.num_rows(), batch.num_rows());

    Ok(FilteredTable {
        batch: filtered,
        base_rows: batch.num_rows(),
    })
}

/// Memoised filtered table shared by every panel
pub struct FilteredView {
    base: Arc<BaseTable>,
    cell: Reactive<Arc<FilteredTable>>,
}

impl FilteredView {
    pub fn new(base: Arc<BaseTable>) -> Self {
        Self {
            base,
            cell: Reactive::new(FILTER_INPUTS.to_vec()),
        }
    }

    pub fn base(&self) -> &Arc<BaseTable> {
        &self.base
    }

    /// Whether the next read recomputes
    pub fn is_stale(&self, state: &FilterState) -> bool {
        self.cell.is_stale(state)
    }

    /// The filtered table for the current selection
    pub fn current(&mut self, state: &FilterState) -> Result<Arc<FilteredTable>, DataError> {
        let base = &self.base;
        self.cell
            .try_get_or_compute(state, |selection| filter_table(base, selection).map(Arc::new))
            .cloned()
    }
}
