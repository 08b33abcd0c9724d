//! Color utilities for plots

use egui::Color32;

/// Drawn for rows whose hue value is missing
pub const MISSING_COLOR: Color32 = Color32::from_rgb(150, 150, 150);

/// Get a categorical color from the qualitative palette
pub fn categorical_color(index: usize) -> Color32 {
    const PALETTE: &[Color32] = &[
        Color32::from_rgb(99, 110, 250),   // Blue
        Color32::from_rgb(239, 85, 59),    // Red
        Color32::from_rgb(0, 204, 150),    // Green
        Color32::from_rgb(171, 99, 250),   // Purple
        Color32::from_rgb(255, 161, 90),   // Orange
        Color32::from_rgb(25, 211, 243),   // Cyan
        Color32::from_rgb(255, 102, 146),  // Pink
        Color32::from_rgb(182, 232, 128),  // Lime
        Color32::from_rgb(255, 151, 255),  // Magenta
        Color32::from_rgb(254, 203, 82),   // Yellow
    ];
    PALETTE[index % PALETTE.len()]
}

/// Plasma color map, `t` in [0, 1]
pub fn plasma_color(t: f32) -> Color32 {
    const STOPS: [[u8; 3]; 10] = [
        [13, 8, 135],
        [70, 3, 159],
        [114, 1, 168],
        [156, 23, 158],
        [189, 55, 134],
        [216, 87, 107],
        [237, 121, 83],
        [251, 159, 58],
        [253, 202, 38],
        [240, 249, 33],
    ];
    interpolate_stops(&STOPS, t)
}

/// Diverging color map (blue-white-red), `t` in [0, 1]
pub fn diverging_color(t: f32) -> Color32 {
    const STOPS: [[u8; 3]; 5] = [
        [5, 48, 97],
        [103, 169, 207],
        [247, 247, 247],
        [239, 138, 98],
        [103, 0, 31],
    ];
    interpolate_stops(&STOPS, t)
}

fn interpolate_stops(stops: &[[u8; 3]], t: f32) -> Color32 {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (stops.len() - 1) as f32;
    let lower = (scaled.floor() as usize).min(stops.len() - 2);
    let s = scaled - lower as f32;

    let mix = |a: u8, b: u8| (a as f32 * (1.0 - s) + b as f32 * s).round() as u8;
    let (a, b) = (stops[lower], stops[lower + 1]);
    Color32::from_rgb(mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]))
}

/// Black or white, whichever reads better on `background`
pub fn contrasting_text(background: Color32) -> Color32 {
    let luminance = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luminance > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
