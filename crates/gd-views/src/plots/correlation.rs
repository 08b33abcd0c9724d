//! Correlation heatmap over the dataset's measures

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};
use gd_core::{DataField, Reactive, FILTER_INPUTS};
use gd_data::DataError;
use ndarray::Array2;
use serde_json::{json, Value};

use super::encoding::numeric_values;
use super::utils::{contrasting_text, diverging_color, pairwise_complete, pearson, MISSING_COLOR};
use super::{current_artifact, error_ui, no_data_ui};
use crate::{SpaceView, SpaceViewId, ViewerContext};

/// Measures the matrix is computed over, in display order
pub const CORRELATION_FIELDS: [DataField; 3] = [DataField::GdpCap, DataField::LifeExp, DataField::Population];

/// Pearson coefficients between every pair of measures
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub fields: Vec<DataField>,
    /// Symmetric, `NaN` where the coefficient is undefined
    pub values: Array2<f64>,
    /// Rows of the filtered table the matrix was computed from
    pub rows: usize,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get((i, j)).copied().filter(|v| !v.is_nan())
    }

    /// Cell annotation, two decimals or "n/a"
    pub fn label(&self, i: usize, j: usize) -> String {
        self.get(i, j).map(|v| format!("{v:.2}")).unwrap_or_else(|| "n/a".to_string())
    }
}

/// Pairwise-complete Pearson correlation over [`CORRELATION_FIELDS`].
/// The diagonal is 1 and every defined entry lies in [-1, 1].
pub fn build_correlation(batch: &RecordBatch) -> Result<CorrelationMatrix, DataError> {
    let columns = CORRELATION_FIELDS
        .iter()
        .map(|field| numeric_values(batch, *field))
        .collect::<Result<Vec<_>, _>>()?;

    let n = columns.len();
    let mut values = Array2::from_elem((n, n), f64::NAN);
    for i in 0..n {
        values[[i, i]] = 1.0;
        for j in (i + 1)..n {
            let (x, y) = pairwise_complete(&columns[i], &columns[j]);
            let r = pearson(&x, &y).unwrap_or(f64::NAN);
            values[[i, j]] = r;
            values[[j, i]] = r;
        }
    }

    Ok(CorrelationMatrix {
        fields: CORRELATION_FIELDS.to_vec(),
        values,
        rows: batch.num_rows(),
    })
}

fn correlation_color(value: Option<f64>) -> Color32 {
    value
        .map(|v| diverging_color(((v + 1.0) / 2.0) as f32))
        .unwrap_or(MISSING_COLOR)
}

/// Configuration for the correlation view
#[derive(Debug, Clone)]
pub struct CorrelationConfig {
    pub show_values: bool,
    pub max_cell_size: f32,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            show_values: true,
            max_cell_size: 120.0,
        }
    }
}

/// Annotated correlation heatmap
pub struct CorrelationView {
    id: SpaceViewId,
    title: String,
    pub config: CorrelationConfig,
    cell: Reactive<Arc<CorrelationMatrix>>,
}

impl CorrelationView {
    pub fn new(id: SpaceViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: CorrelationConfig::default(),
            cell: Reactive::new(FILTER_INPUTS.to_vec()),
        }
    }

    fn heatmap_ui(&self, ui: &mut Ui, data: &CorrelationMatrix) {
        let n = data.fields.len();
        let margin = 90.0;
        let available = ui.available_size();
        let cell_size = ((available.x.min(available.y) - margin - 80.0) / n as f32)
            .clamp(24.0, self.config.max_cell_size);
        let (response, painter) = ui.allocate_painter(
            Vec2::new(margin + cell_size * n as f32 + 80.0, margin + cell_size * n as f32),
            Sense::hover(),
        );
        let origin = response.rect.min + Vec2::splat(margin);
        let label_color = ui.visuals().text_color();
        let font = FontId::proportional(12.0);

        let mut hovered = None;
        for i in 0..n {
            for j in 0..n {
                let cell_rect = Rect::from_min_size(
                    origin + Vec2::new(j as f32 * cell_size, i as f32 * cell_size),
                    Vec2::splat(cell_size),
                );
                let color = correlation_color(data.get(i, j));
                painter.rect_filled(cell_rect.shrink(1.0), 2.0, color);
                if self.config.show_values {
                    painter.text(
                        cell_rect.center(),
                        Align2::CENTER_CENTER,
                        data.label(i, j),
                        font.clone(),
                        contrasting_text(color),
                    );
                }
                if response.hover_pos().is_some_and(|p| cell_rect.contains(p)) {
                    hovered = Some((i, j));
                }
            }
        }

        for (k, field) in data.fields.iter().enumerate() {
            let offset = (k as f32 + 0.5) * cell_size;
            painter.text(
                Pos2::new(origin.x + offset, origin.y - 6.0),
                Align2::CENTER_BOTTOM,
                field.column_name(),
                font.clone(),
                label_color,
            );
            painter.text(
                Pos2::new(origin.x - 6.0, origin.y + offset),
                Align2::RIGHT_CENTER,
                field.column_name(),
                font.clone(),
                label_color,
            );
        }

        let scale = Rect::from_min_size(
            Pos2::new(origin.x + n as f32 * cell_size + 20.0, origin.y),
            Vec2::new(16.0, n as f32 * cell_size),
        );
        let steps = 64;
        for s in 0..steps {
            let t = s as f32 / (steps - 1) as f32;
            let y = scale.max.y - t * scale.height();
            painter.line_segment(
                [Pos2::new(scale.min.x, y), Pos2::new(scale.max.x, y)],
                Stroke::new(scale.height() / steps as f32 + 1.0, diverging_color(t)),
            );
        }
        for (text, y, align) in [
            ("1.0", scale.min.y, Align2::LEFT_TOP),
            ("0.0", scale.center().y, Align2::LEFT_CENTER),
            ("-1.0", scale.max.y, Align2::LEFT_BOTTOM),
        ] {
            painter.text(Pos2::new(scale.max.x + 4.0, y), align, text, font.clone(), label_color);
        }

        if let Some((i, j)) = hovered {
            response.on_hover_text_at_pointer(format!(
                "{} / {}: {}",
                data.fields[i].column_name(),
                data.fields[j].column_name(),
                data.label(i, j)
            ));
        }
    }
}

impl SpaceView for CorrelationView {
    fn id(&self) -> SpaceViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "CorrelationView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        let artifact = current_artifact(ctx, &mut self.cell, "correlation matrix", |table, _| {
            build_correlation(table.batch())
        });

        ui.heading("Correlation Heatmap");
        match artifact {
            Ok(data) if data.is_empty() => no_data_ui(ui),
            Ok(data) => {
                self.heatmap_ui(ui, &data);
                ui.separator();
                ui.label(format!("{} rows, Pearson correlation", data.rows));
            }
            Err(e) => error_ui(ui, &e),
        }
    }

    fn save_config(&self) -> Value {
        json!({
            "show_values": self.config.show_values,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(show) = config.get("show_values").and_then(|v| v.as_bool()) {
            self.config.show_values = show;
        }
    }
}
