//! egui renderings of the control definitions

use std::collections::BTreeSet;

use egui::{ComboBox, ScrollArea, Slider, Ui};
use gd_core::{CheckboxGroupControl, DataField, MultiSelectControl, RangeControl, SelectControl};

/// Drop-down over the control's fields. Returns true when the choice changed.
pub fn select_control(ui: &mut Ui, control: &SelectControl, value: &mut DataField) -> bool {
    let before = *value;
    ui.label(&control.label);
    ComboBox::from_id_source(control.id)
        .selected_text(value.column_name())
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            for field in &control.choices {
                ui.selectable_value(value, *field, field.column_name());
            }
        });
    *value != before
}

/// Single integer slider
pub fn range_slider(ui: &mut Ui, control: &RangeControl, value: &mut i64) -> bool {
    ui.label(&control.label);
    ui.add(
        Slider::new(value, control.min..=control.max)
            .step_by(control.step as f64)
            .clamp_to_range(true),
    )
    .changed()
}

/// Lower and upper handles of an inclusive range. The handles may cross, in
/// which case the range selects nothing.
pub fn range_pair(ui: &mut Ui, control: &RangeControl, range: &mut (i64, i64)) -> bool {
    ui.label(&control.label);
    let mut changed = false;
    for (text, value) in [("from", &mut range.0), ("to", &mut range.1)] {
        changed |= ui
            .add(
                Slider::new(value, control.min..=control.max)
                    .step_by(control.step as f64)
                    .clamp_to_range(true)
                    .text(text),
            )
            .changed();
    }
    if range.0 > range.1 {
        ui.label(egui::RichText::new("Start year is after end year").weak());
    }
    changed
}

/// One checkbox per choice
pub fn checkbox_group(ui: &mut Ui, control: &CheckboxGroupControl, selected: &mut BTreeSet<String>) -> bool {
    ui.label(&control.label);
    let mut changed = false;
    for choice in &control.choices {
        let mut checked = selected.contains(choice);
        if ui.checkbox(&mut checked, choice).changed() {
            changed = true;
            toggle(selected, choice, checked);
        }
    }
    changed
}

/// Scrollable multi-select list with a search box and all/none shortcuts
pub fn multi_select(
    ui: &mut Ui,
    control: &MultiSelectControl,
    selected: &mut BTreeSet<String>,
    search: &mut String,
) -> bool {
    let mut changed = false;
    ui.label(format!("{} ({} of {})", control.label, selected.len(), control.choices.len()));

    ui.horizontal(|ui| {
        if ui.small_button("All").clicked() {
            changed |= select_all(selected, &control.choices);
        }
        if ui.small_button("None").clicked() {
            changed |= !selected.is_empty();
            selected.clear();
        }
    });
    ui.add(egui::TextEdit::singleline(search).hint_text("Search..."));

    ScrollArea::vertical()
        .id_source(control.id)
        .max_height(180.0)
        .show(ui, |ui| {
            for choice in matching(&control.choices, search) {
                let mut checked = selected.contains(choice);
                if ui.checkbox(&mut checked, choice.as_str()).changed() {
                    changed = true;
                    toggle(selected, choice, checked);
                }
            }
        });
    changed
}

fn toggle(selected: &mut BTreeSet<String>, choice: &str, checked: bool) {
    if checked {
        selected.insert(choice.to_string());
    } else {
        selected.remove(choice);
    }
}

fn select_all(selected: &mut BTreeSet<String>, choices: &[String]) -> bool {
    let before = selected.len();
    selected.extend(choices.iter().cloned());
    selected.len() != before
}

/// Choices containing `search`, ignoring case
pub fn matching<'a>(choices: &'a [String], search: &str) -> impl Iterator<Item = &'a String> {
    let needle = search.trim().to_lowercase();
    choices
        .iter()
        .filter(move |choice| needle.is_empty() || choice.to_lowercase().contains(&needle))
}
