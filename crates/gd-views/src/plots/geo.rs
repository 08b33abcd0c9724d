//! Choropleth map keyed by ISO alpha-3 code

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use egui::{Color32, Stroke, Ui};
use egui_plot::{Plot, PlotPoints, Polygon};
use gd_core::fields::columns;
use gd_core::{DataField, HoveredData, InputId, Reactive, FILTER_INPUTS};
use gd_data::{DataError, WorldBoundaries};
use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::info;

use super::encoding::{format_value, numeric_values, string_values, HueEncoding};
use super::{current_artifact, error_ui, no_data_ui};
use crate::{SpaceView, SpaceViewId, ViewerContext};

/// Fill of outlines with no row in the filtered table
const NO_DATA_FILL: Color32 = Color32::from_rgba_premultiplied(60, 60, 60, 60);

/// Value drawn for one region
#[derive(Debug, Clone, PartialEq)]
pub struct RegionValue {
    /// Table row the value was taken from
    pub row: usize,
    pub country: String,
    /// Hue value as shown in the tooltip
    pub label: String,
    pub color: Color32,
}

/// Everything needed to draw the map
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethArtifact {
    pub hue: HueEncoding,
    /// Regions in order of first appearance
    pub regions: IndexMap<String, RegionValue>,
    /// Countries with data but no outline to draw them in
    pub unmapped: Vec<String>,
}

impl ChoroplethArtifact {
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn describe(&self, iso: &str) -> Option<String> {
        let region = self.regions.get(iso)?;
        Some(format!(
            "{} ({})\n{}: {}",
            region.country,
            iso,
            self.hue.field().column_name(),
            region.label
        ))
    }
}

/// One region per ISO code. When several rows share a code the last row in
/// table order supplies the value. Rows without a code are left out.
pub fn build_choropleth(
    batch: &RecordBatch,
    hue_field: DataField,
    boundaries: Option<&WorldBoundaries>,
) -> Result<ChoroplethArtifact, DataError> {
    let codes = string_values(batch, columns::ISO_ALPHA)?;
    let countries = string_values(batch, columns::COUNTRY)?;
    let hue = HueEncoding::build(batch, hue_field)?;
    let labels = hue_labels(batch, hue_field)?;

    let mut regions: IndexMap<String, RegionValue> = IndexMap::new();
    for (row, code) in codes.into_iter().enumerate() {
        let Some(code) = code.filter(|c| !c.trim().is_empty()) else {
            continue;
        };
        regions.insert(
            code.trim().to_string(),
            RegionValue {
                row,
                country: countries[row].clone().unwrap_or_default(),
                label: labels[row].clone(),
                color: hue.color(row),
            },
        );
    }

    let unmapped = regions
        .iter()
        .filter(|(code, _)| !boundaries.is_some_and(|b| b.contains_code(code)))
        .map(|(_, region)| region.country.clone())
        .collect();

    Ok(ChoroplethArtifact { hue, regions, unmapped })
}

fn hue_labels(batch: &RecordBatch, field: DataField) -> Result<Vec<String>, DataError> {
    if field.is_numeric() {
        Ok(numeric_values(batch, field)?
            .into_iter()
            .map(|v| format_value(v.unwrap_or(f64::NAN)))
            .collect())
    } else {
        Ok(string_values(batch, field.column_name())?
            .into_iter()
            .map(|v| v.unwrap_or_else(|| "n/a".to_string()))
            .collect())
    }
}

/// Exterior rings of a region as plot coordinates (lon, lat)
type Outline = Vec<Vec<[f64; 2]>>;

fn outlines(boundaries: &WorldBoundaries) -> Vec<(String, Outline)> {
    let mut outlines: Vec<(String, Outline)> = boundaries
        .iter()
        .map(|(iso, shape)| {
            let rings = shape
                .0
                .iter()
                .map(|polygon| polygon.exterior().coords().map(|c| [c.x, c.y]).collect())
                .collect();
            (iso.to_string(), rings)
        })
        .collect();
    outlines.sort_by(|a, b| a.0.cmp(&b.0));
    outlines
}

/// Configuration for the map view
#[derive(Debug, Clone)]
pub struct ChoroplethConfig {
    pub border_width: f32,
    pub show_unmapped: bool,
}

impl Default for ChoroplethConfig {
    fn default() -> Self {
        Self {
            border_width: 0.5,
            show_unmapped: true,
        }
    }
}

/// Choropleth map view
pub struct ChoroplethView {
    id: SpaceViewId,
    title: String,
    pub config: ChoroplethConfig,
    cell: Reactive<Arc<ChoroplethArtifact>>,
    outlines: Option<Vec<(String, Outline)>>,
}

impl ChoroplethView {
    pub fn new(id: SpaceViewId, title: String) -> Self {
        let mut inputs = FILTER_INPUTS.to_vec();
        inputs.push(InputId::Hue);
        Self {
            id,
            title,
            config: ChoroplethConfig::default(),
            cell: Reactive::new(inputs),
            outlines: None,
        }
    }

    pub(crate) fn artifact(&mut self, ctx: &ViewerContext) -> Result<Arc<ChoroplethArtifact>, DataError> {
        let boundaries = ctx.boundaries.clone();
        current_artifact(ctx, &mut self.cell, "map", |table, selection| {
            build_choropleth(table.batch(), selection.hue, boundaries.as_deref())
        })
    }

    fn map_ui(&mut self, ctx: &ViewerContext, ui: &mut Ui, data: &ChoroplethArtifact) {
        let Some(boundaries) = ctx.boundaries.as_deref() else {
            ui.label(egui::RichText::new("No boundaries file loaded; regions are listed below.").weak());
            return;
        };
        let outlines = self.outlines.get_or_insert_with(|| {
            info!("Preparing {} region outlines", boundaries.len());
            outlines(boundaries)
        });

        let (min, max) = boundaries
            .bounds()
            .map(|r| ([r.min().x, r.min().y], [r.max().x, r.max().y]))
            .unwrap_or(([-180.0, -90.0], [180.0, 90.0]));

        let stroke = Stroke::new(self.config.border_width, ui.visuals().widgets.noninteractive.fg_stroke.color);
        let height = (ui.available_height() - 40.0).max(200.0);
        let plot = Plot::new(self.id)
            .data_aspect(1.0)
            .height(height)
            .include_x(min[0])
            .include_x(max[0])
            .include_y(min[1])
            .include_y(max[1])
            .show_axes([false, false])
            .show_grid(false)
            .allow_zoom(true)
            .allow_drag(true);

        let response = plot.show(ui, |plot_ui| {
            for (iso, rings) in outlines.iter() {
                let fill = data.regions.get(iso).map(|r| r.color).unwrap_or(NO_DATA_FILL);
                for ring in rings {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(ring.clone()))
                            .fill_color(fill)
                            .stroke(stroke),
                    );
                }
            }
            plot_ui
                .pointer_coordinate()
                .and_then(|p| boundaries.region_at(p.x, p.y))
                .map(str::to_string)
        });

        let hovered = response.inner.filter(|iso| data.regions.contains_key(iso));
        {
            let mut current = ctx.hovered_data.write();
            match hovered.as_deref().and_then(|iso| data.regions.get(iso).map(|r| (iso, r))) {
                Some((iso, region)) => {
                    *current = HoveredData {
                        view: Some(self.title.clone()),
                        country: Some(region.country.clone()),
                        detail: data.describe(iso),
                    };
                }
                None if current.view.as_deref() == Some(self.title.as_str()) => current.clear(),
                None => {}
            }
        }
        if let Some(text) = hovered.and_then(|iso| data.describe(&iso)) {
            response.response.on_hover_text_at_pointer(text);
        }
    }

    fn unmapped_ui(&self, ui: &mut Ui, data: &ChoroplethArtifact) {
        if !self.config.show_unmapped || data.unmapped.is_empty() {
            return;
        }
        egui::CollapsingHeader::new(format!("Countries without an outline ({})", data.unmapped.len()))
            .id_source((self.id, "unmapped"))
            .show(ui, |ui| {
                egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                    for country in &data.unmapped {
                        ui.label(country);
                    }
                });
            });
    }
}

impl SpaceView for ChoroplethView {
    fn id(&self) -> SpaceViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "ChoroplethView"
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        let artifact = self.artifact(ctx);

        ui.heading("Interactive Map");
        match artifact {
            Ok(data) if data.is_empty() => no_data_ui(ui),
            Ok(data) => {
                ui.horizontal_top(|ui| {
                    let size = egui::vec2((ui.available_width() - 120.0).max(200.0), ui.available_height());
                    ui.allocate_ui(size, |ui| {
                        ui.vertical(|ui| {
                            self.map_ui(ctx, ui, &data);
                            self.unmapped_ui(ui, &data);
                        });
                    });
                    ui.vertical(|ui| data.hue.legend_ui(ui));
                });
            }
            Err(e) => error_ui(ui, &e),
        }
    }

    fn save_config(&self) -> Value {
        json!({
            "border_width": self.config.border_width,
            "show_unmapped": self.config.show_unmapped,
        })
    }

    fn load_config(&mut self, config: Value) {
        if let Some(width) = config.get("border_width").and_then(|v| v.as_f64()) {
            self.config.border_width = width as f32;
        }
        if let Some(show) = config.get("show_unmapped").and_then(|v| v.as_bool()) {
            self.config.show_unmapped = show;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{filtered_all, filtered_none, sample_base, table_from};
    use gd_data::sources::DEFAULT_ISO_PROPERTY;

    const AFGHANISTAN_ONLY: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": { "ISO_A3": "AFG" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[60.0, 29.0], [75.0, 29.0], [75.0, 39.0], [60.0, 39.0], [60.0, 29.0]]]
            }
        }]
    }"#;

    #[test]
    fn test_last_row_wins() {
        let base = sample_base();
        let table = filtered_all(&base);
        let data = build_choropleth(table.batch(), DataField::LifeExp, None).unwrap();

        let codes: Vec<&str> = data.regions.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["AFG", "ALB", "AGO"]);
        assert_eq!(data.regions["AFG"].row, 3);
        assert_eq!(data.regions["ALB"].row, 4);
        assert_eq!(data.regions["ALB"].label, "76.42");
        assert_eq!(data.regions["ALB"].color, data.hue.color(4));
        assert_eq!(data.describe("AGO").unwrap(), "Angola (AGO)\nlife_exp: 34");
    }

    #[test]
    fn test_unmapped_regions() {
        let base = sample_base();
        let table = filtered_all(&base);
        let boundaries = WorldBoundaries::from_geojson_str(AFGHANISTAN_ONLY, DEFAULT_ISO_PROPERTY).unwrap();

        let data = build_choropleth(table.batch(), DataField::Continent, Some(&boundaries)).unwrap();
        assert_eq!(data.unmapped, vec!["Albania", "Angola"]);
        assert_eq!(data.regions["AFG"].label, "Asia");

        let data = build_choropleth(table.batch(), DataField::Continent, None).unwrap();
        assert_eq!(data.unmapped.len(), 3);
    }

    #[test]
    fn test_rows_without_code_are_skipped() {
        let base = table_from(
            "country,continent,year,life_exp,population,gdp_cap,iso_alpha\n\
             Kosovo,Europe,2007,70,100,1,\n\
             Chad,Africa,2007,50,200,2,TCD\n",
        );
        let data = build_choropleth(base.batch(), DataField::Population, None).unwrap();
        assert_eq!(data.regions.len(), 1);
        assert_eq!(data.regions["TCD"].label, "200");
    }

    #[test]
    fn test_empty_selection() {
        let base = sample_base();
        let data = build_choropleth(filtered_none(&base).batch(), DataField::LifeExp, None).unwrap();
        assert!(data.is_empty());
        assert!(data.unmapped.is_empty());
    }

    #[test]
    fn test_outlines_are_exterior_rings() {
        let boundaries = WorldBoundaries::from_geojson_str(AFGHANISTAN_ONLY, DEFAULT_ISO_PROPERTY).unwrap();
        let outlines = outlines(&boundaries);
        assert_eq!(outlines.len(), 1);
        assert_eq!(outlines[0].0, "AFG");
        assert_eq!(outlines[0].1[0].first(), Some(&[60.0, 29.0]));
    }
}
