//! Main application entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use gd_core::events::EventBus;
use gd_core::ControlSet;
use gd_data::schema::gapminder_schema;
use gd_data::{ConfigOverrides, DashboardConfig};
use tracing::info;

mod dashboard;
mod startup;

use dashboard::{build_viewport, Dashboard};

/// Interactive explorer for the GapMinder life expectancy dataset
#[derive(Parser, Debug)]
#[command(name = "gapdash", version, about)]
struct Cli {
    /// GapMinder CSV file
    #[arg(long, value_name = "CSV")]
    data: Option<PathBuf>,

    /// GeoJSON country outlines for the map
    #[arg(long, value_name = "GEOJSON")]
    boundaries: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Start in dark mode
    #[arg(long)]
    dark: bool,

    /// Print the effective configuration, including panel settings, and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            data: self.data.clone(),
            boundaries: self.boundaries.clone(),
            dark: self.dark,
        }
    }

    fn dashboard_config(&self) -> Result<DashboardConfig> {
        let config = match &self.config {
            Some(path) => DashboardConfig::load(path)
                .with_context(|| format!("Failed to read configuration {}", path.display()))?,
            None => DashboardConfig::default(),
        };
        Ok(self.overrides().apply(config))
    }
}

/// The resolved configuration with every panel's settings filled in.
/// Needs no dataset, only the fixed column schema.
fn effective_config(config: &DashboardConfig) -> Result<DashboardConfig> {
    let (size, size_scale) =
        ControlSet::size_controls(&gapminder_schema(), &(&config.defaults).into()).context("Invalid chart defaults")?;
    let viewport = build_viewport(&size, &size_scale, &config.views);

    let mut effective = config.clone();
    effective.views = viewport.save_configs();
    Ok(effective)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = cli.dashboard_config()?;

    if cli.print_config {
        println!("{}", effective_config(&config)?.to_json_string()?);
        return Ok(());
    }

    info!("Starting GapMinder dashboard with {}", config.dataset_path.display());

    let events = Arc::new(EventBus::new());
    startup::log_events(&events);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    let startup = runtime.block_on(startup::load(config, events.clone()))?;
    drop(runtime);

    let viewport = build_viewport(&startup.controls.size, &startup.controls.size_scale, &startup.config.views);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(gd_ui::APP_TITLE)
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([900.0, 600.0]),
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        gd_ui::APP_TITLE,
        options,
        Box::new(move |cc| Box::new(Dashboard::new(cc, startup, viewport))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from(["gapdash", "--data", "other.csv", "--dark"]);
        let config = cli.dashboard_config().unwrap();
        assert_eq!(config.dataset_path, PathBuf::from("other.csv"));
        assert!(config.dark_mode);

        let plain = Cli::parse_from(["gapdash"]).dashboard_config().unwrap();
        assert!(!plain.dark_mode);
        assert_eq!(config.boundaries_path, None);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["gapdash", "--config", "/nonexistent/gapdash.json"]);
        assert!(cli.dashboard_config().is_err());
    }

    #[test]
    fn test_print_config_does_not_read_the_dataset() {
        let cli = Cli::parse_from(["gapdash", "--data", "/nonexistent/gapminder.csv", "--print-config"]);
        assert!(cli.print_config);

        let effective = effective_config(&cli.dashboard_config().unwrap()).unwrap();
        assert_eq!(effective.dataset_path, PathBuf::from("/nonexistent/gapminder.csv"));
        assert_eq!(effective.views["GridView"]["max_cell_chars"], 50);
        assert!(effective.to_json_string().unwrap().contains("BubblePlotView"));
    }
}
