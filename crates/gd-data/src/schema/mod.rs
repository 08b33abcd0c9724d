use arrow::datatypes::{DataType, Field, Schema};
use gd_core::fields::columns;

use crate::DataError;

/// The fixed GapMinder schema, in the column order tables are built with
pub fn gapminder_schema() -> Schema {
    Schema::new(vec![
        Field::new(columns::COUNTRY, DataType::Utf8, false),
        Field::new(columns::CONTINENT, DataType::Utf8, false),
        Field::new(columns::YEAR, DataType::Int64, false),
        Field::new(columns::LIFE_EXP, DataType::Float64, true),
        Field::new(columns::POPULATION, DataType::Float64, true),
        Field::new(columns::GDP_CAP, DataType::Float64, true),
        Field::new(columns::ISO_ALPHA, DataType::Utf8, true),
    ])
}

/// Positions of the required columns inside a CSV header
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    /// Header index for each field of [`gapminder_schema`], in schema order
    pub positions: Vec<usize>,
}

impl ColumnLayout {
    /// Locate every required column by name. Extra columns are ignored and
    /// the order of the header does not matter.
    pub fn from_headers<'a, I>(headers: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();
        let schema = gapminder_schema();

        let positions = schema
            .fields()
            .iter()
            .map(|field| {
                headers
                    .iter()
                    .position(|h| *h == field.name().as_str())
                    .ok_or_else(|| DataError::MissingColumn(field.name().clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { positions })
    }
}

/// Check that a schema carries every GapMinder column with the right type
pub fn validate_schema(schema: &Schema) -> Result<(), DataError> {
    for expected in gapminder_schema().fields() {
        let found = schema
            .field_with_name(expected.name())
            .map_err(|_| DataError::MissingColumn(expected.name().clone()))?;

        if found.data_type() != expected.data_type() {
            return Err(DataError::ColumnType {
                column: expected.name().clone(),
                expected: expected.data_type().to_string(),
                found: found.data_type().to_string(),
            });
        }
    }
    Ok(())
}
