use egui::{Color32, Context, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};
use std::collections::BTreeMap;

/// Theme configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub dark_mode: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self { dark_mode: false }
    }
}

impl Theme {
    pub fn name(&self) -> &'static str {
        if self.dark_mode {
            "Dark"
        } else {
            "Light"
        }
    }
}

/// Colours one theme variant is built from
struct Palette {
    bg: Color32,
    panel_bg: Color32,
    widget_bg: Color32,
    hover: Color32,
    active: Color32,
    border: Color32,
    text: Color32,
    code_bg: Color32,
}

impl Palette {
    fn dark() -> Self {
        Self {
            bg: Color32::from_rgb(23, 23, 23),
            panel_bg: Color32::from_rgb(31, 31, 31),
            widget_bg: Color32::from_rgb(40, 40, 40),
            hover: Color32::from_rgb(50, 50, 50),
            active: Color32::from_rgb(60, 60, 60),
            border: Color32::from_rgb(70, 70, 70),
            text: Color32::from_rgb(220, 220, 220),
            code_bg: Color32::from_rgb(35, 35, 35),
        }
    }

    fn light() -> Self {
        Self {
            bg: Color32::from_rgb(255, 255, 255),
            panel_bg: Color32::from_rgb(246, 246, 248),
            widget_bg: Color32::from_rgb(232, 232, 236),
            hover: Color32::from_rgb(220, 220, 226),
            active: Color32::from_rgb(205, 205, 214),
            border: Color32::from_rgb(190, 190, 198),
            text: Color32::from_rgb(30, 30, 34),
            code_bg: Color32::from_rgb(238, 238, 242),
        }
    }
}

/// Build the visuals for a theme
pub fn visuals(theme: &Theme) -> Visuals {
    let (mut visuals, palette) = if theme.dark_mode {
        (Visuals::dark(), Palette::dark())
    } else {
        (Visuals::light(), Palette::light())
    };
    let accent = accent_color();

    visuals.window_fill = palette.panel_bg;
    visuals.panel_fill = palette.panel_bg;
    visuals.extreme_bg_color = palette.bg;
    visuals.faint_bg_color = palette.widget_bg;

    let widgets = [
        (&mut visuals.widgets.noninteractive, palette.widget_bg, palette.border),
        (&mut visuals.widgets.inactive, palette.widget_bg, palette.border),
        (&mut visuals.widgets.hovered, palette.hover, palette.border),
        (&mut visuals.widgets.active, palette.active, accent),
    ];
    for (widget, fill, border) in widgets {
        widget.bg_fill = fill;
        widget.weak_bg_fill = fill;
        widget.bg_stroke = Stroke::new(1.0, border);
        widget.fg_stroke = Stroke::new(1.0, palette.text);
        widget.rounding = Rounding::same(4.0);
    }

    visuals.selection.bg_fill = accent.linear_multiply(0.3);
    visuals.selection.stroke = Stroke::new(1.0, accent);
    visuals.hyperlink_color = accent;
    visuals.code_bg_color = palette.code_bg;
    visuals.window_shadow.extrusion = 8.0;
    visuals.popup_shadow.extrusion = 4.0;
    visuals
}

/// Apply the application theme
pub fn apply_theme(ctx: &Context, theme: &Theme) {
    let mut style = Style::default();

    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    style.spacing.menu_margin = egui::Margin::same(8.0);
    style.spacing.indent = 20.0;

    let mut font_sizes = BTreeMap::new();
    font_sizes.insert(TextStyle::Small, FontId::new(11.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Body, FontId::new(13.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Button, FontId::new(13.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Heading, FontId::new(18.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace));
    style.text_styles = font_sizes;

    style.visuals = visuals(theme);
    ctx.set_style(style);
    tracing::debug!("Applied {} theme", theme.name());
}

/// Get the accent color for the theme
pub fn accent_color() -> Color32 {
    Color32::from_rgb(100, 150, 250)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_differ() {
        let dark = visuals(&Theme { dark_mode: true });
        let light = visuals(&Theme { dark_mode: false });
        assert!(dark.dark_mode);
        assert!(!light.dark_mode);
        assert_ne!(dark.panel_fill, light.panel_fill);
        assert_eq!(dark.selection.stroke.color, accent_color());
    }
}
