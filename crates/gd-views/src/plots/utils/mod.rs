//! Utilities for plot views

pub mod colors;
pub mod stats;

// Re-export commonly used items
pub use colors::{categorical_color, contrasting_text, diverging_color, plasma_color, MISSING_COLOR};
pub use stats::{finite_range, pairwise_complete, pearson};
