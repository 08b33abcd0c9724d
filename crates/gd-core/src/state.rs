//! Application state shared outside the filter selection

/// Application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub dark_mode: bool,
    pub show_status_bar: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            show_status_bar: true,
        }
    }
}

/// Row currently under the pointer in any view
#[derive(Default, Clone, Debug, PartialEq)]
pub struct HoveredData {
    pub view: Option<String>,
    pub country: Option<String>,
    pub detail: Option<String>,
}

impl HoveredData {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
