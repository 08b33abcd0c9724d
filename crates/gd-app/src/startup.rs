//! Everything that happens before the window opens

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use gd_core::data::DataSource;
use gd_core::events::events::{DatasetError, DatasetLoaded, FilterChanged};
use gd_core::events::EventBus;
use gd_core::{ControlSet, FilterChange, FilterState, FilterSubscriber};
use gd_data::{BaseTable, CsvSource, DashboardConfig, WorldBoundaries};
use tracing::{debug, info, warn};

/// Loaded data and the state built from it
pub struct Startup {
    pub config: DashboardConfig,
    pub base: Arc<BaseTable>,
    pub boundaries: Option<Arc<WorldBoundaries>>,
    pub controls: ControlSet,
    pub filters: Arc<FilterState>,
    pub events: Arc<EventBus>,
    /// Kept alive here because the filter state only holds it weakly
    pub forwarder: Arc<FilterEventForwarder>,
}

/// Publishes a [`FilterChanged`] event for every sidebar edit
pub struct FilterEventForwarder {
    events: Arc<EventBus>,
}

impl FilterSubscriber for FilterEventForwarder {
    fn on_filter_change(&self, change: &FilterChange) {
        self.events.publish(FilterChanged {
            revision: change.revision,
            inputs: change.changed.iter().map(|id| format!("{id:?}")).collect(),
        });
    }
}

/// Log every dashboard event
pub fn log_events(events: &EventBus) {
    events.subscribe(|e: &DatasetLoaded| {
        info!("Dataset {} loaded: {} rows, {} columns", e.source_name, e.row_count, e.column_count);
    });
    events.subscribe(|e: &DatasetError| {
        tracing::error!("Dataset {} failed to load: {}", e.source_name, e.error);
    });
    events.subscribe(|e: &FilterChanged| {
        debug!("Revision {}: {} changed", e.revision, e.inputs.join(", "));
    });
}

/// Load the dataset and the optional boundaries, then build the controls and
/// the filter state. A dataset that cannot be read is fatal; a boundaries
/// file that cannot be read only disables the map outlines.
pub async fn load(config: DashboardConfig, events: Arc<EventBus>) -> Result<Startup> {
    let path = config.dataset_path.clone();
    let source = match CsvSource::open(&path).await {
        Ok(source) => source,
        Err(e) => {
            events.publish(DatasetError {
                source_name: path.display().to_string(),
                error: e.to_string(),
            });
            return Err(e).with_context(|| format!("Failed to load dataset {}", path.display()));
        }
    };

    let row_count = source.row_count().await?;
    let column_count = source.schema().await.fields().len();
    let source_name = source.source_name().to_string();
    let base = Arc::new(BaseTable::new(source.query_all().await?, source_name.clone())?);

    events.publish(DatasetLoaded {
        source_name,
        row_count,
        column_count,
    });

    let boundaries = match &config.boundaries_path {
        Some(path) => match WorldBoundaries::load(path, &config.iso_property).await {
            Ok(boundaries) => Some(Arc::new(boundaries)),
            Err(e) => {
                warn!("Map outlines unavailable, {} could not be read: {}", path.display(), e);
                None
            }
        },
        None => None,
    };

    let year_bounds = base
        .year_bounds()?
        .ok_or_else(|| anyhow!("Dataset {} has no rows", path.display()))?;
    let controls = ControlSet::gapminder(&base.schema(), base.countries()?, year_bounds, &(&config.defaults).into())
        .context("Invalid chart defaults")?;

    let filters = Arc::new(FilterState::new(controls.initial_selection()));
    let forwarder = Arc::new(FilterEventForwarder { events: events.clone() });
    filters.add_subscriber(forwarder.clone());

    Ok(Startup {
        config,
        base,
        boundaries,
        controls,
        filters,
        events,
        forwarder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
country,continent,year,life_exp,population,gdp_cap,iso_alpha
Afghanistan,Asia,1952,28.801,8425333,779.4453145,AFG
Albania,Europe,1952,55.23,1282697,1601.056136,ALB
Angola,Africa,1962,34.0,4826015,4269.276742,AGO
";

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("gapdash-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn config_for(dataset: std::path::PathBuf) -> DashboardConfig {
        DashboardConfig {
            dataset_path: dataset,
            ..DashboardConfig::default()
        }
    }

    #[tokio::test]
    async fn test_load_builds_controls_and_forwards_changes() {
        let path = temp_file("startup.csv", CSV);
        let events = Arc::new(EventBus::new());
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = seen.clone();
        events.subscribe(move |e: &FilterChanged| sink.lock().push(e.inputs.clone()));

        let startup = load(config_for(path.clone()), events).await.unwrap();
        assert_eq!(startup.base.num_rows(), 3);
        assert_eq!((startup.controls.year.min, startup.controls.year.max), (1952, 1962));
        assert!(startup.boundaries.is_none());

        startup.filters.set_continents(["Asia"]);
        assert_eq!(seen.lock().as_slice(), &[vec!["Continent".to_string()]]);

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_missing_dataset_is_fatal_and_reported() {
        let events = Arc::new(EventBus::new());
        let errors = Arc::new(parking_lot::Mutex::new(0));
        let sink = errors.clone();
        events.subscribe(move |_: &DatasetError| *sink.lock() += 1);

        let missing = std::env::temp_dir().join("gapdash-does-not-exist.csv");
        assert!(load(config_for(missing), events).await.is_err());
        assert_eq!(*errors.lock(), 1);
    }

    #[tokio::test]
    async fn test_bad_boundaries_are_not_fatal() {
        let data = temp_file("outlines.csv", CSV);
        let outlines = temp_file("outlines.geojson", "not geojson");
        let config = DashboardConfig {
            boundaries_path: Some(outlines.clone()),
            ..config_for(data.clone())
        };

        let startup = load(config, Arc::new(EventBus::new())).await.unwrap();
        assert!(startup.boundaries.is_none());

        std::fs::remove_file(data).ok();
        std::fs::remove_file(outlines).ok();
    }

    #[tokio::test]
    async fn test_unknown_default_field_is_rejected() {
        let path = temp_file("defaults.csv", CSV);
        let mut config = config_for(path.clone());
        config.defaults.hue = "iso_alpha".to_string();

        assert!(load(config, Arc::new(EventBus::new())).await.is_err());
        std::fs::remove_file(path).ok();
    }
}
