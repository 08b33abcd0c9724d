//! Column extraction and colour encoding shared by the charts

use arrow::array::{Array, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use egui::{Color32, Rect, Stroke, Ui, Vec2};
use gd_core::DataField;
use gd_data::DataError;
use indexmap::IndexMap;

use super::utils::{categorical_color, finite_range, plasma_color, MISSING_COLOR};

/// Number of colour steps numeric hues are drawn with
pub const HUE_LEVELS: usize = 32;

/// Values of a numeric field as `f64`, nulls as `None`
pub fn numeric_values(batch: &RecordBatch, field: DataField) -> Result<Vec<Option<f64>>, DataError> {
    let name = field.column_name();
    let array = batch
        .column_by_name(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;

    if let Some(floats) = array.as_any().downcast_ref::<Float64Array>() {
        Ok(floats.iter().collect())
    } else if let Some(ints) = array.as_any().downcast_ref::<Int64Array>() {
        Ok(ints.iter().map(|v| v.map(|v| v as f64)).collect())
    } else {
        Err(DataError::ColumnType {
            column: name.to_string(),
            expected: "numeric".to_string(),
            found: array.data_type().to_string(),
        })
    }
}

/// Values of a string column, nulls as `None`
pub fn string_values(batch: &RecordBatch, column: &str) -> Result<Vec<Option<String>>, DataError> {
    let array = batch
        .column_by_name(column)
        .ok_or_else(|| DataError::MissingColumn(column.to_string()))?;
    let strings = array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| DataError::ColumnType {
            column: column.to_string(),
            expected: "Utf8".to_string(),
            found: array.data_type().to_string(),
        })?;
    Ok(strings.iter().map(|v| v.map(str::to_string)).collect())
}

/// Rows drawn in one colour
#[derive(Debug, Clone, PartialEq)]
pub struct HueSeries {
    /// Legend entry, `None` for steps of a continuous scale
    pub name: Option<String>,
    pub color: Color32,
    pub rows: Vec<usize>,
}

/// Per-row colours for the hue field
#[derive(Debug, Clone, PartialEq)]
pub enum HueEncoding {
    /// Distinct values in first-appearance order, each with a palette colour
    Categorical {
        field: DataField,
        categories: IndexMap<String, Color32>,
        row_category: Vec<Option<usize>>,
    },
    /// Values mapped onto the plasma scale between `min` and `max`
    Continuous {
        field: DataField,
        min: f64,
        max: f64,
        positions: Vec<Option<f32>>,
    },
}

impl HueEncoding {
    pub fn build(batch: &RecordBatch, field: DataField) -> Result<Self, DataError> {
        if field.is_numeric() {
            let values = numeric_values(batch, field)?;
            let (min, max) = finite_range(values.iter().flatten().copied()).unwrap_or((0.0, 0.0));
            let positions = values
                .iter()
                .map(|v| v.filter(|v| v.is_finite()).map(|v| scale_position(v, min, max)))
                .collect();
            Ok(Self::Continuous { field, min, max, positions })
        } else {
            let values = string_values(batch, field.column_name())?;
            let mut categories: IndexMap<String, Color32> = IndexMap::new();
            let row_category = values
                .into_iter()
                .map(|value| {
                    value.map(|value| {
                        let next = categories.len();
                        let entry = categories.entry(value);
                        let index = entry.index();
                        entry.or_insert_with(|| categorical_color(next));
                        index
                    })
                })
                .collect();
            Ok(Self::Categorical { field, categories, row_category })
        }
    }

    pub fn field(&self) -> DataField {
        match self {
            Self::Categorical { field, .. } | Self::Continuous { field, .. } => *field,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Categorical { row_category, .. } => row_category.len(),
            Self::Continuous { positions, .. } => positions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Colour of one row
    pub fn color(&self, row: usize) -> Color32 {
        match self {
            Self::Categorical { categories, row_category, .. } => row_category
                .get(row)
                .copied()
                .flatten()
                .and_then(|i| categories.get_index(i))
                .map(|(_, color)| *color)
                .unwrap_or(MISSING_COLOR),
            Self::Continuous { positions, .. } => positions
                .get(row)
                .copied()
                .flatten()
                .map(plasma_color)
                .unwrap_or(MISSING_COLOR),
        }
    }

    /// Legend entries of a categorical encoding
    pub fn legend(&self) -> Vec<(&str, Color32)> {
        match self {
            Self::Categorical { categories, .. } => {
                categories.iter().map(|(name, color)| (name.as_str(), *color)).collect()
            }
            Self::Continuous { .. } => Vec::new(),
        }
    }

    /// Group `rows` by colour. Categorical series follow first-appearance
    /// order; continuous values are binned into [`HUE_LEVELS`] steps.
    /// Rows with a missing hue form a trailing series.
    pub fn series(&self, rows: impl IntoIterator<Item = usize>) -> Vec<HueSeries> {
        let mut groups: IndexMap<Option<usize>, Vec<usize>> = IndexMap::new();
        for row in rows {
            groups.entry(self.group_of(row)).or_default().push(row);
        }

        let missing = groups.shift_remove(&None);
        groups.sort_keys();

        let mut series: Vec<HueSeries> = groups
            .into_iter()
            .filter_map(|(group, rows)| group.map(|g| (g, rows)))
            .map(|(group, rows)| match self {
                Self::Categorical { categories, .. } => {
                    let (name, color) = categories
                        .get_index(group)
                        .map(|(name, color)| (Some(name.clone()), *color))
                        .unwrap_or((None, MISSING_COLOR));
                    HueSeries { name, color, rows }
                }
                Self::Continuous { .. } => HueSeries {
                    name: None,
                    color: plasma_color((group as f32 + 0.5) / HUE_LEVELS as f32),
                    rows,
                },
            })
            .collect();

        if let Some(rows) = missing {
            series.push(HueSeries {
                name: Some("n/a".to_string()),
                color: MISSING_COLOR,
                rows,
            });
        }
        series
    }

    fn group_of(&self, row: usize) -> Option<usize> {
        match self {
            Self::Categorical { row_category, .. } => row_category.get(row).copied().flatten(),
            Self::Continuous { positions, .. } => positions
                .get(row)
                .copied()
                .flatten()
                .map(|t| ((t * HUE_LEVELS as f32) as usize).min(HUE_LEVELS - 1)),
        }
    }

    /// Legend or colour bar beside a chart
    pub fn legend_ui(&self, ui: &mut Ui) {
        match self {
            Self::Categorical { field, categories, .. } => {
                ui.label(egui::RichText::new(field.column_name()).strong());
                for (name, color) in categories {
                    ui.horizontal(|ui| {
                        let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.0), egui::Sense::hover());
                        ui.painter().rect_filled(rect, 2.0, *color);
                        ui.label(name);
                    });
                }
            }
            Self::Continuous { field, min, max, .. } => {
                ui.label(egui::RichText::new(field.column_name()).strong());
                ui.label(format_value(*max));
                let (rect, _) = ui.allocate_exact_size(Vec2::new(16.0, 160.0), egui::Sense::hover());
                paint_color_bar(ui, rect);
                ui.label(format_value(*min));
            }
        }
    }
}

/// Position of `v` on a scale from `min` to `max`. A constant column sits in
/// the middle of the scale.
pub fn scale_position(v: f64, min: f64, max: f64) -> f32 {
    if max > min {
        ((v - min) / (max - min)).clamp(0.0, 1.0) as f32
    } else {
        0.5
    }
}

fn paint_color_bar(ui: &Ui, rect: Rect) {
    let painter = ui.painter();
    let steps = 64;
    for i in 0..steps {
        let t = i as f32 / (steps - 1) as f32;
        // Top of the bar is the maximum
        let y = rect.max.y - t * rect.height();
        painter.line_segment(
            [egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)],
            Stroke::new(rect.height() / steps as f32 + 1.0, plasma_color(t)),
        );
    }
}

/// Compact number formatting for labels and tooltips
pub fn format_value(v: f64) -> String {
    if !v.is_finite() {
        "n/a".to_string()
    } else if v.abs() >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_base, table_from};

    #[test]
    fn test_numeric_values_year_and_measure() {
        let base = sample_base();
        let years = numeric_values(base.batch(), DataField::Year).unwrap();
        assert_eq!(years[0], Some(1952.0));
        assert!(numeric_values(base.batch(), DataField::Continent).is_err());
    }

    #[test]
    fn test_categorical_first_appearance_order() {
        let base = sample_base();
        let hue = HueEncoding::build(base.batch(), DataField::Continent).unwrap();

        let legend: Vec<&str> = hue.legend().into_iter().map(|(name, _)| name).collect();
        assert_eq!(legend, vec!["Asia", "Europe", "Africa"]);
        assert_eq!(hue.color(0), categorical_color(0));
        assert_eq!(hue.color(2), categorical_color(2));
        assert_eq!(hue.color(3), hue.color(0));

        let series = hue.series(0..hue.len());
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].name.as_deref(), Some("Asia"));
        assert_eq!(series[0].rows, vec![0, 3]);
        assert_eq!(series[1].rows, vec![1, 4]);
    }

    #[test]
    fn test_continuous_scale_endpoints() {
        let base = sample_base();
        let hue = HueEncoding::build(base.batch(), DataField::LifeExp).unwrap();
        match &hue {
            HueEncoding::Continuous { min, max, positions, .. } => {
                assert!((min - 28.801).abs() < 1e-9);
                assert!((max - 76.423).abs() < 1e-9);
                assert_eq!(positions[0], Some(0.0));
                assert_eq!(positions[4], Some(1.0));
            }
            other => panic!("expected continuous encoding, got {other:?}"),
        }
        assert_eq!(hue.color(0), plasma_color(0.0));
        assert!(hue.legend().is_empty());
    }

    #[test]
    fn test_constant_and_missing_hue() {
        let base = table_from(
            "country,continent,year,life_exp,population,gdp_cap,iso_alpha\n\
             A,Asia,1952,50,100,1,AAA\n\
             B,Asia,1957,50,,2,BBB\n",
        );
        let hue = HueEncoding::build(base.batch(), DataField::LifeExp).unwrap();
        assert_eq!(hue.color(0), plasma_color(0.5));
        assert_eq!(hue.color(1), plasma_color(0.5));

        let hue = HueEncoding::build(base.batch(), DataField::Population).unwrap();
        assert_eq!(hue.color(1), MISSING_COLOR);
        let series = hue.series([0, 1]);
        assert_eq!(series.last().unwrap().rows, vec![1]);
        assert_eq!(series.last().unwrap().color, MISSING_COLOR);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1952.0), "1952");
        assert_eq!(format_value(28.8012), "28.80");
        assert_eq!(format_value(8_425_333.0), "8.43M");
        assert_eq!(format_value(f64::NAN), "n/a");
    }
}
