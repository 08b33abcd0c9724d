//! The dashboard window

use std::sync::Arc;

use eframe::egui;
use gd_core::{AppSettings, RangeControl, SelectControl};
use gd_ui::{apply_theme, status_bar, top_bar, Sidebar, StatusInfo, Theme, APP_TITLE};
use gd_views::{
    BarChartView, BubblePlotView, ChoroplethView, CorrelationView, GridView, ScatterPlotView, SpaceView,
    SpaceViewId, ViewerContext, Viewport,
};
use tracing::{debug, info};

use crate::startup::{FilterEventForwarder, Startup};

/// One panel per tab, in tab order
pub fn panel_views(size: &SelectControl, size_scale: &RangeControl) -> Vec<Box<dyn SpaceView>> {
    vec![
        Box::new(GridView::new(SpaceViewId::new_v4(), "Data Grid".to_string())),
        Box::new(BarChartView::new(SpaceViewId::new_v4(), "Bar Charts".to_string())),
        Box::new(ScatterPlotView::new(SpaceViewId::new_v4(), "Scatterplots".to_string())),
        Box::new(BubblePlotView::new(
            SpaceViewId::new_v4(),
            "Bubble Plots".to_string(),
            size.clone(),
            size_scale.clone(),
        )),
        Box::new(ChoroplethView::new(SpaceViewId::new_v4(), "Maps".to_string())),
        Box::new(CorrelationView::new(SpaceViewId::new_v4(), "Statistics".to_string())),
    ]
}

/// Build the viewport and apply the saved panel settings
pub fn build_viewport(size: &SelectControl, size_scale: &RangeControl, views_config: &serde_json::Value) -> Viewport {
    let views = panel_views(size, size_scale);
    for view in &views {
        debug!("Created {} {}", view.view_type(), view.id());
    }

    let mut viewport = Viewport::with_tabs(views);
    if !views_config.is_null() {
        viewport.load_configs(views_config);
    }
    viewport
}

/// Main application state
pub struct Dashboard {
    viewport: Viewport,
    viewer_context: ViewerContext,
    sidebar: Sidebar,
    settings: AppSettings,
    /// Theme currently applied to the context
    theme: Theme,
    _forwarder: Arc<FilterEventForwarder>,
}

impl Dashboard {
    pub fn new(cc: &eframe::CreationContext<'_>, startup: Startup, viewport: Viewport) -> Self {
        let settings = AppSettings {
            dark_mode: startup.config.dark_mode,
            ..AppSettings::default()
        };
        let theme = Theme { dark_mode: settings.dark_mode };
        apply_theme(&cc.egui_ctx, &theme);

        let mut viewer_context = ViewerContext::new(startup.base, startup.filters, startup.events);
        if let Some(boundaries) = startup.boundaries {
            viewer_context = viewer_context.with_boundaries(boundaries);
        }

        info!("Dashboard ready with tabs: {}", viewport.tab_titles().join(", "));

        Self {
            viewport,
            viewer_context,
            sidebar: Sidebar::new(startup.controls),
            settings,
            theme,
            _forwarder: startup.forwarder,
        }
    }

    fn status(&self) -> StatusInfo {
        let filtered_rows = self
            .viewer_context
            .filtered_table()
            .map(|table| table.num_rows())
            .unwrap_or(0);
        StatusInfo {
            source_name: self.viewer_context.base.source_name().to_string(),
            base_rows: self.viewer_context.base.num_rows(),
            filtered_rows,
            revision: self.viewer_context.filters.revision(),
            hovered: self.viewer_context.hovered_data.read().detail.clone(),
        }
    }
}

impl eframe::App for Dashboard {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.theme.dark_mode != self.settings.dark_mode {
            self.theme = Theme { dark_mode: self.settings.dark_mode };
            apply_theme(ctx, &self.theme);
        }

        top_bar(ctx, APP_TITLE, &mut self.settings);

        egui::SidePanel::left("filters")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                let changed = self.sidebar.ui(ui, &self.viewer_context.filters, &mut self.settings);
                if !changed.is_empty() {
                    debug!("Sidebar changed {:?}", changed);
                }
            });

        if self.settings.show_status_bar {
            let status = self.status();
            status_bar(ctx, &status);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewport.ui(ui, &self.viewer_context);
        });
    }
}
