use std::collections::BTreeSet;

use super::InputId;
use crate::fields::DataField;

/// Snapshot of every control value
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub continents: BTreeSet<String>,
    pub countries: BTreeSet<String>,
    /// Inclusive year range
    pub year_range: (i64, i64),
    pub x_axis: DataField,
    pub y_axis: DataField,
    pub hue: DataField,
    pub size: DataField,
    pub size_scale: u32,
}

impl FilterSelection {
    /// Selection with everything visible and the default chart fields
    pub fn select_all<C, K>(continents: C, countries: K, year_range: (i64, i64)) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        Self {
            continents: continents.into_iter().map(Into::into).collect(),
            countries: countries.into_iter().map(Into::into).collect(),
            year_range,
            x_axis: DataField::Year,
            y_axis: DataField::LifeExp,
            hue: DataField::Population,
            size: DataField::Population,
            size_scale: 10,
        }
    }

    /// Check a row against the continent, country and year constraints
    pub fn matches(&self, continent: &str, country: &str, year: i64) -> bool {
        let (lo, hi) = self.year_range;
        lo <= year && year <= hi
            && self.continents.contains(continent)
            && self.countries.contains(country)
    }

    /// Inputs whose values differ between `self` and `other`
    pub fn changed_inputs(&self, other: &FilterSelection) -> Vec<InputId> {
        InputId::ALL
            .into_iter()
            .filter(|id| match id {
                InputId::Continent => self.continents != other.continents,
                InputId::Country => self.countries != other.countries,
                InputId::Year => self.year_range != other.year_range,
                InputId::XAxis => self.x_axis != other.x_axis,
                InputId::YAxis => self.y_axis != other.y_axis,
                InputId::Hue => self.hue != other.hue,
                InputId::Size => self.size != other.size,
                InputId::SizeScale => self.size_scale != other.size_scale,
            })
            .collect()
    }
}
