//! Viewport - hosts the panels as dock tabs

use std::collections::HashMap;
use egui::Ui;
use egui_dock::{DockArea, DockState, TabViewer};
use serde_json::{Map, Value};

use crate::{SpaceView, SpaceViewId, ViewerContext};

/// The tabbed area holding every panel
pub struct Viewport {
    dock_state: DockState<SpaceViewId>,
    space_views: HashMap<SpaceViewId, Box<dyn SpaceView>>,
    /// Insertion order, which is also the tab order
    order: Vec<SpaceViewId>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            dock_state: DockState::new(vec![]),
            space_views: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Create a viewport with one tab per view, in the given order
    pub fn with_tabs(views: Vec<Box<dyn SpaceView>>) -> Self {
        let mut viewport = Self::new();
        for view in views {
            viewport.add_space_view(view);
        }
        viewport
    }

    /// Add a space view as the last tab
    pub fn add_space_view(&mut self, view: Box<dyn SpaceView>) {
        let id = view.id();
        self.space_views.insert(id, view);
        self.order.push(id);

        if self.dock_state.main_surface().is_empty() {
            self.dock_state = DockState::new(vec![id]);
        } else {
            self.dock_state.push_to_first_leaf(id);
        }
    }

    /// Tab titles in order
    pub fn tab_titles(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|id| self.space_views.get(id))
            .map(|view| view.display_name())
            .collect()
    }

    pub fn view(&self, id: SpaceViewId) -> Option<&dyn SpaceView> {
        self.space_views.get(&id).map(|view| view.as_ref())
    }

    /// Configuration of every view, keyed by view type
    pub fn save_configs(&self) -> Value {
        let configs: Map<String, Value> = self
            .order
            .iter()
            .filter_map(|id| self.space_views.get(id))
            .map(|view| (view.view_type().to_string(), view.save_config()))
            .collect();
        Value::Object(configs)
    }

    /// Apply configurations produced by [`Viewport::save_configs`]
    pub fn load_configs(&mut self, configs: &Value) {
        for view in self.space_views.values_mut() {
            if let Some(config) = configs.get(view.view_type()) {
                view.load_config(config.clone());
            }
        }
    }

    /// Draw the viewport
    pub fn ui(&mut self, ui: &mut Ui, viewer_context: &ViewerContext) {
        let available_rect = ui.available_rect_before_wrap();

        ui.allocate_ui(available_rect.size(), |ui| {
            DockArea::new(&mut self.dock_state)
                .show_close_buttons(false)
                .draggable_tabs(true)
                .show_tab_name_on_hover(true)
                .show_inside(ui, &mut ViewportTabViewer {
                    space_views: &mut self.space_views,
                    viewer_context,
                });
        });
    }
}

/// Tab viewer for egui_dock
struct ViewportTabViewer<'a> {
    space_views: &'a mut HashMap<SpaceViewId, Box<dyn SpaceView>>,
    viewer_context: &'a ViewerContext,
}

impl<'a> TabViewer for ViewportTabViewer<'a> {
    type Tab = SpaceViewId;

    fn title(&mut self, tab: &mut Self::Tab) -> egui::WidgetText {
        if let Some(view) = self.space_views.get(tab) {
            view.display_name().into()
        } else {
            "Unknown".into()
        }
    }

    fn ui(&mut self, ui: &mut Ui, tab: &mut Self::Tab) {
        if let Some(view) = self.space_views.get_mut(tab) {
            view.ui(self.viewer_context, ui);
        }
    }
}
