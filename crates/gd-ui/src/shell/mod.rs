use egui::{Context, TopBottomPanel};
use gd_core::AppSettings;

/// Facts shown in the status bar
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusInfo {
    pub source_name: String,
    pub base_rows: usize,
    pub filtered_rows: usize,
    pub revision: u64,
    /// Description of the row under the pointer, if any
    pub hovered: Option<String>,
}

impl StatusInfo {
    pub fn rows_text(&self) -> String {
        format!("{} of {} rows", self.filtered_rows, self.base_rows)
    }
}

/// Render the title bar
pub fn top_bar(ctx: &Context, title: &str, settings: &mut AppSettings) {
    TopBottomPanel::top("top_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.heading(title);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.menu_button("View", |ui| {
                    if ui.checkbox(&mut settings.show_status_bar, "Status Bar").clicked() {
                        ui.close_menu();
                    }
                    if ui.checkbox(&mut settings.dark_mode, "Dark mode").clicked() {
                        ui.close_menu();
                    }
                });
            });
        });
    });
}

/// Render the status bar
pub fn status_bar(ctx: &Context, status: &StatusInfo) {
    TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(&status.source_name);
            ui.separator();
            ui.label(status.rows_text());

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(egui::RichText::new(format!("rev {}", status.revision)).weak());
                if let Some(hovered) = &status.hovered {
                    ui.separator();
                    ui.label(hovered.replace('\n', "  "));
                }
            });
        });
    });
}
