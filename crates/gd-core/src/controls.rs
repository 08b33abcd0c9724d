//! Sidebar control definitions
//!
//! Controls are validated against the table schema when they are defined, so
//! a view can never be asked for a field the table does not have.

use arrow::datatypes::Schema;
use thiserror::Error;

use crate::fields::{columns, DataField, CONTINENTS};
use crate::filters::{FilterSelection, InputId};

/// Errors raised while defining controls
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{field}' is not offered by control '{control}'")]
    NotAllowed { control: String, field: String },

    #[error("column '{0}' is missing from the table schema")]
    MissingColumn(String),

    #[error("value {value} of control '{control}' is outside {min}..={max}")]
    OutOfRange { control: String, value: i64, min: i64, max: i64 },
}

/// A single-choice drop-down over table fields
#[derive(Debug, Clone)]
pub struct SelectControl {
    pub id: InputId,
    pub label: String,
    pub choices: Vec<DataField>,
    pub selected: DataField,
}

impl SelectControl {
    /// Define a drop-down from column names, checking every name against the
    /// field catalogue and the schema.
    pub fn new(
        id: InputId,
        label: impl Into<String>,
        choices: &[&str],
        selected: &str,
        schema: &Schema,
    ) -> Result<Self, ControlError> {
        let label = label.into();
        let choices = choices
            .iter()
            .map(|name| resolve_field(name, schema))
            .collect::<Result<Vec<_>, _>>()?;

        let selected_field = resolve_field(selected, schema)?;
        if !choices.contains(&selected_field) {
            return Err(ControlError::NotAllowed {
                control: label,
                field: selected.to_string(),
            });
        }

        Ok(Self { id, label, choices, selected: selected_field })
    }

    pub fn allows(&self, field: DataField) -> bool {
        self.choices.contains(&field)
    }
}

/// An integer slider
#[derive(Debug, Clone)]
pub struct RangeControl {
    pub id: InputId,
    pub label: String,
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

impl RangeControl {
    pub fn new(id: InputId, label: impl Into<String>, min: i64, max: i64, step: i64) -> Self {
        Self { id, label: label.into(), min, max, step: step.max(1) }
    }

    /// Check that `value` lies within the slider bounds
    pub fn validate(&self, value: i64) -> Result<i64, ControlError> {
        if value < self.min || value > self.max {
            return Err(ControlError::OutOfRange {
                control: self.label.clone(),
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value)
    }
}

/// A group of checkboxes
#[derive(Debug, Clone)]
pub struct CheckboxGroupControl {
    pub id: InputId,
    pub label: String,
    pub choices: Vec<String>,
}

/// A multi-select list
#[derive(Debug, Clone)]
pub struct MultiSelectControl {
    pub id: InputId,
    pub label: String,
    pub choices: Vec<String>,
}

/// Default field choices, given as column names
#[derive(Debug, Clone)]
pub struct ControlDefaults {
    pub x_axis: String,
    pub y_axis: String,
    pub hue: String,
    pub size: String,
    pub size_scale: i64,
}

impl Default for ControlDefaults {
    fn default() -> Self {
        Self {
            x_axis: columns::YEAR.to_string(),
            y_axis: columns::LIFE_EXP.to_string(),
            hue: columns::POPULATION.to_string(),
            size: columns::POPULATION.to_string(),
            size_scale: 10,
        }
    }
}

/// Every control of the dashboard
#[derive(Debug, Clone)]
pub struct ControlSet {
    pub continent: CheckboxGroupControl,
    pub country: MultiSelectControl,
    pub year: RangeControl,
    pub x_axis: SelectControl,
    pub y_axis: SelectControl,
    pub hue: SelectControl,
    pub size: SelectControl,
    pub size_scale: RangeControl,
    /// Initial size-scale slider value
    pub initial_size_scale: u32,
}

impl ControlSet {
    /// Build and validate the GapMinder controls
    pub fn gapminder(
        schema: &Schema,
        countries: Vec<String>,
        year_bounds: (i64, i64),
        defaults: &ControlDefaults,
    ) -> Result<Self, ControlError> {
        let numeric: Vec<&str> = DataField::NUMERIC.iter().map(|f| f.column_name()).collect();
        let hue: Vec<&str> = DataField::HUE.iter().map(|f| f.column_name()).collect();

        for column in [columns::CONTINENT, columns::COUNTRY, columns::YEAR] {
            if schema.field_with_name(column).is_err() {
                return Err(ControlError::MissingColumn(column.to_string()));
            }
        }

        let (size, size_scale) = Self::size_controls(schema, defaults)?;
        let initial_size_scale = size_scale.validate(defaults.size_scale)? as u32;

        Ok(Self {
            continent: CheckboxGroupControl {
                id: InputId::Continent,
                label: "Continent".to_string(),
                choices: CONTINENTS.iter().map(|c| c.to_string()).collect(),
            },
            country: MultiSelectControl {
                id: InputId::Country,
                label: "Country".to_string(),
                choices: countries,
            },
            year: RangeControl::new(InputId::Year, "Year", year_bounds.0, year_bounds.1, 1),
            x_axis: SelectControl::new(InputId::XAxis, "X-axis", &numeric, &defaults.x_axis, schema)?,
            y_axis: SelectControl::new(InputId::YAxis, "Y-axis", &numeric, &defaults.y_axis, schema)?,
            hue: SelectControl::new(InputId::Hue, "Hue", &hue, &defaults.hue, schema)?,
            size,
            size_scale,
            initial_size_scale,
        })
    }

    /// The bubble plot's own "Size Variable" and "Size Scale" controls.
    /// They only depend on the schema, not on the loaded rows.
    pub fn size_controls(schema: &Schema, defaults: &ControlDefaults) -> Result<(SelectControl, RangeControl), ControlError> {
        let numeric: Vec<&str> = DataField::NUMERIC.iter().map(|f| f.column_name()).collect();
        let size = SelectControl::new(InputId::Size, "Size Variable", &numeric, &defaults.size, schema)?;
        let size_scale = RangeControl::new(InputId::SizeScale, "Size Scale", 1, 100, 1);
        size_scale.validate(defaults.size_scale)?;
        Ok((size, size_scale))
    }

    /// Initial selection: everything visible, default fields chosen
    pub fn initial_selection(&self) -> FilterSelection {
        FilterSelection {
            continents: self.continent.choices.iter().cloned().collect(),
            countries: self.country.choices.iter().cloned().collect(),
            year_range: (self.year.min, self.year.max),
            x_axis: self.x_axis.selected,
            y_axis: self.y_axis.selected,
            hue: self.hue.selected,
            size: self.size.selected,
            size_scale: self.initial_size_scale,
        }
    }
}

fn resolve_field(name: &str, schema: &Schema) -> Result<DataField, ControlError> {
    let field = DataField::from_column_name(name)
        .ok_or_else(|| ControlError::UnknownField(name.to_string()))?;
    if schema.field_with_name(field.column_name()).is_err() {
        return Err(ControlError::MissingColumn(field.column_name().to_string()));
    }
    Ok(field)
}
