//! Field catalogue for the GapMinder dataset

use serde::{Serialize, Deserialize};
use std::fmt;

/// Column names of the GapMinder table
pub mod columns {
    pub const COUNTRY: &str = "country";
    pub const CONTINENT: &str = "continent";
    pub const YEAR: &str = "year";
    pub const LIFE_EXP: &str = "life_exp";
    pub const POPULATION: &str = "population";
    pub const GDP_CAP: &str = "gdp_cap";
    pub const ISO_ALPHA: &str = "iso_alpha";

    /// Every column the loader requires
    pub const REQUIRED: [&str; 7] = [COUNTRY, CONTINENT, YEAR, LIFE_EXP, POPULATION, GDP_CAP, ISO_ALPHA];
}

/// Continents offered by the continent filter
pub const CONTINENTS: [&str; 5] = ["Asia", "Africa", "Europe", "Americas", "Oceania"];

/// A field that charts can be keyed or coloured by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataField {
    Population,
    Year,
    LifeExp,
    GdpCap,
    Continent,
}

impl DataField {
    /// Fields offered by the axis and size selectors
    pub const NUMERIC: [DataField; 4] = [
        DataField::Population,
        DataField::Year,
        DataField::LifeExp,
        DataField::GdpCap,
    ];

    /// Fields offered by the hue selector
    pub const HUE: [DataField; 5] = [
        DataField::Population,
        DataField::Year,
        DataField::LifeExp,
        DataField::GdpCap,
        DataField::Continent,
    ];

    /// Column name in the table
    pub fn column_name(self) -> &'static str {
        match self {
            DataField::Population => columns::POPULATION,
            DataField::Year => columns::YEAR,
            DataField::LifeExp => columns::LIFE_EXP,
            DataField::GdpCap => columns::GDP_CAP,
            DataField::Continent => columns::CONTINENT,
        }
    }

    /// Look up a field by its column name
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::HUE.into_iter().find(|field| field.column_name() == name)
    }

    /// Whether the field holds numbers (as opposed to categories)
    pub fn is_numeric(self) -> bool {
        !matches!(self, DataField::Continent)
    }
}

impl fmt::Display for DataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_name_lookup() {
        for field in DataField::HUE {
            assert_eq!(DataField::from_column_name(field.column_name()), Some(field));
        }
        assert_eq!(DataField::from_column_name("iso_alpha"), None);
        assert_eq!(DataField::from_column_name("LIFE_EXP"), None);
    }

    #[test]
    fn test_numeric_fields() {
        assert!(DataField::NUMERIC.iter().all(|f| f.is_numeric()));
        assert!(!DataField::Continent.is_numeric());
    }
}
