//! The "Filters" sidebar

use egui::{ScrollArea, Ui};
use gd_core::{AppSettings, ControlSet, FilterSelection, FilterState, InputId};

use crate::widgets::{checkbox_group, multi_select, range_pair, select_control};

/// Sidebar with the global filter and chart field controls
pub struct Sidebar {
    controls: ControlSet,
    country_search: String,
}

impl Sidebar {
    pub fn new(controls: ControlSet) -> Self {
        Self {
            controls,
            country_search: String::new(),
        }
    }

    /// Draw the controls and write any edits back to `state`.
    /// Returns the inputs that changed this frame.
    pub fn ui(&mut self, ui: &mut Ui, state: &FilterState, settings: &mut AppSettings) -> Vec<InputId> {
        let mut edited = state.snapshot();

        ui.heading("Filters");
        ui.separator();

        ScrollArea::vertical().id_source("sidebar_scroll").show(ui, |ui| {
            self.filter_controls(ui, &mut edited);
            ui.separator();
            self.field_controls(ui, &mut edited);
            ui.separator();
            ui.checkbox(&mut settings.dark_mode, "Dark mode");
        });

        state.replace(edited)
    }

    fn filter_controls(&mut self, ui: &mut Ui, edited: &mut FilterSelection) {
        checkbox_group(ui, &self.controls.continent, &mut edited.continents);
        ui.add_space(6.0);
        multi_select(ui, &self.controls.country, &mut edited.countries, &mut self.country_search);
        ui.add_space(6.0);
        range_pair(ui, &self.controls.year, &mut edited.year_range);
    }

    fn field_controls(&self, ui: &mut Ui, edited: &mut FilterSelection) {
        select_control(ui, &self.controls.x_axis, &mut edited.x_axis);
        select_control(ui, &self.controls.y_axis, &mut edited.y_axis);
        select_control(ui, &self.controls.hue, &mut edited.hue);
    }
}
