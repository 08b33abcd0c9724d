//! Dashboard configuration file

use std::path::{Path, PathBuf};

use gd_core::ControlDefaults;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::sources::DEFAULT_ISO_PROPERTY;
use crate::DataError;

/// Settings read from the JSON configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub dataset_path: PathBuf,
    pub boundaries_path: Option<PathBuf>,
    /// GeoJSON property carrying the ISO alpha-3 code
    pub iso_property: String,
    pub dark_mode: bool,
    pub defaults: ChartDefaults,
    /// Per-panel settings keyed by view type
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub views: serde_json::Value,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/gapminder_full.csv"),
            boundaries_path: None,
            iso_property: DEFAULT_ISO_PROPERTY.to_string(),
            dark_mode: false,
            defaults: ChartDefaults::default(),
            views: serde_json::Value::Null,
        }
    }
}

/// Initial chart field choices, by column name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartDefaults {
    pub x_axis: String,
    pub y_axis: String,
    pub hue: String,
    pub size: String,
    pub size_scale: i64,
}

impl Default for ChartDefaults {
    fn default() -> Self {
        let defaults = ControlDefaults::default();
        Self {
            x_axis: defaults.x_axis,
            y_axis: defaults.y_axis,
            hue: defaults.hue,
            size: defaults.size,
            size_scale: defaults.size_scale,
        }
    }
}

impl From<&ChartDefaults> for ControlDefaults {
    fn from(defaults: &ChartDefaults) -> Self {
        Self {
            x_axis: defaults.x_axis.clone(),
            y_axis: defaults.y_axis.clone(),
            hue: defaults.hue.clone(),
            size: defaults.size.clone(),
            size_scale: defaults.size_scale,
        }
    }
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data: Option<PathBuf>,
    pub boundaries: Option<PathBuf>,
    pub dark: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: DashboardConfig) -> DashboardConfig {
        if let Some(data) = &self.data {
            config.dataset_path = data.clone();
        }
        if let Some(boundaries) = &self.boundaries {
            config.boundaries_path = Some(boundaries.clone());
        }
        if self.dark {
            config.dark_mode = true;
        }
        config
    }
}

impl DashboardConfig {
    /// Load from a JSON file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, DataError> {
        serde_json::from_str(text).map_err(|e| DataError::Config(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String, DataError> {
        serde_json::to_string_pretty(self).map_err(|e| DataError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_take_defaults() {
        let config = DashboardConfig::from_json_str(r#"{ "defaults": { "hue": "continent" } }"#).unwrap();
        assert!(!config.dark_mode);
        assert_eq!(config.defaults.hue, "continent");
        assert_eq!(config.defaults.x_axis, "year");
        assert_eq!(config.defaults.size_scale, 10);
        assert_eq!(config.iso_property, "ISO_A3");
        assert_eq!(config.dataset_path, PathBuf::from("data/gapminder_full.csv"));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = DashboardConfig::from_json_str(
            r#"{ "dataset_path": "file.csv", "boundaries_path": "file.geojson" }"#,
        )
        .unwrap();

        let overrides = ConfigOverrides {
            data: Some(PathBuf::from("cli.csv")),
            boundaries: None,
            dark: true,
        };
        let merged = overrides.apply(file);
        assert_eq!(merged.dataset_path, PathBuf::from("cli.csv"));
        assert_eq!(merged.boundaries_path, Some(PathBuf::from("file.geojson")));
        assert!(merged.dark_mode);

        let untouched = ConfigOverrides::default().apply(DashboardConfig::default());
        assert_eq!(untouched, DashboardConfig::default());
    }

    #[test]
    fn test_view_settings_survive_a_round_trip() {
        let config = DashboardConfig::from_json_str(r#"{ "views": { "GridView": { "max_cell_chars": 20 } } }"#).unwrap();
        assert_eq!(config.views["GridView"]["max_cell_chars"], 20);

        let text = config.to_json_string().unwrap();
        assert_eq!(DashboardConfig::from_json_str(&text).unwrap(), config);
        assert!(!DashboardConfig::default().to_json_string().unwrap().contains("views"));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        assert!(matches!(DashboardConfig::from_json_str("{ nope"), Err(DataError::Config(_))));
    }

    #[test]
    fn test_chart_defaults_into_control_defaults() {
        let chart = ChartDefaults { size_scale: 40, ..ChartDefaults::default() };
        let controls = ControlDefaults::from(&chart);
        assert_eq!(controls.size_scale, 40);
        assert_eq!(controls.y_axis, "life_exp");
    }
}
