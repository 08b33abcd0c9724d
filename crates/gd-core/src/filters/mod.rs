use serde::{Serialize, Deserialize};

mod selection;
mod state;
mod subscriber;

pub use selection::FilterSelection;
pub use state::FilterState;
pub use subscriber::FilterSubscriber;

/// Identifies one user-facing input control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputId {
    Continent,
    Country,
    Year,
    XAxis,
    YAxis,
    Hue,
    Size,
    SizeScale,
}

impl InputId {
    pub const ALL: [InputId; 8] = [
        InputId::Continent,
        InputId::Country,
        InputId::Year,
        InputId::XAxis,
        InputId::YAxis,
        InputId::Hue,
        InputId::Size,
        InputId::SizeScale,
    ];
}

/// Inputs that restrict which rows are visible
pub const FILTER_INPUTS: [InputId; 3] = [InputId::Continent, InputId::Country, InputId::Year];

/// Change notification passed to subscribers
#[derive(Debug, Clone)]
pub struct FilterChange {
    pub revision: u64,
    pub changed: Vec<InputId>,
    pub selection: FilterSelection,
}
