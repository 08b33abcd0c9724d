//! User interface components for the GapMinder dashboard
//!
//! This crate provides the egui renderings of the sidebar controls, the
//! title and status bars, and the light and dark themes.

pub mod shell;
pub mod sidebar;
pub mod theme;
pub mod widgets;

/// Re-export commonly used types
pub use shell::{status_bar, top_bar, StatusInfo};
pub use sidebar::Sidebar;
pub use theme::{apply_theme, Theme};

/// Window and page title
pub const APP_TITLE: &str = "GapMinder Life Expectancy";
