pub mod boundaries;
pub mod csv_source;

pub use boundaries::{WorldBoundaries, DEFAULT_ISO_PROPERTY};
pub use csv_source::{read_table, CsvSource};
