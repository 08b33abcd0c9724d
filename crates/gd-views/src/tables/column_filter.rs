//! Per-column filter expressions for the data grid

/// Numeric comparison operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparison {
    Ge,
    Le,
    Gt,
    Lt,
    Eq,
}

impl Comparison {
    fn holds(self, value: f64, bound: f64) -> bool {
        match self {
            Comparison::Ge => value >= bound,
            Comparison::Le => value <= bound,
            Comparison::Gt => value > bound,
            Comparison::Lt => value < bound,
            Comparison::Eq => value == bound,
        }
    }
}

/// A parsed filter for one grid column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFilter {
    /// Case-insensitive substring of the cell text, stored lowercased
    Contains(String),
    Compare(Comparison, f64),
    /// Inclusive range
    Between(f64, f64),
}

impl ColumnFilter {
    /// Parse the text typed above a column. Numeric columns accept `>=v`,
    /// `<=v`, `>v`, `<v`, `=v` and `lo..hi`; anything else is a substring
    /// match. Blank text means no filter.
    pub fn parse(text: &str, numeric: bool) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if numeric {
            if let Some(filter) = Self::parse_numeric(text) {
                return Some(filter);
            }
        }
        Some(Self::Contains(text.to_lowercase()))
    }

    fn parse_numeric(text: &str) -> Option<Self> {
        const OPERATORS: [(&str, Comparison); 5] = [
            (">=", Comparison::Ge),
            ("<=", Comparison::Le),
            (">", Comparison::Gt),
            ("<", Comparison::Lt),
            ("=", Comparison::Eq),
        ];

        for (prefix, op) in OPERATORS {
            if let Some(rest) = text.strip_prefix(prefix) {
                return rest.trim().parse().ok().map(|bound| Self::Compare(op, bound));
            }
        }

        let (lo, hi) = text.split_once("..")?;
        let lo: f64 = lo.trim().parse().ok()?;
        let hi: f64 = hi.trim().parse().ok()?;
        Some(Self::Between(lo, hi))
    }

    /// Whether a cell's display text passes. Numeric filters never match an
    /// empty or non-numeric cell.
    pub fn matches(&self, cell: &str) -> bool {
        match self {
            Self::Contains(needle) => cell.to_lowercase().contains(needle.as_str()),
            Self::Compare(op, bound) => parse_cell(cell).is_some_and(|v| op.holds(v, *bound)),
            Self::Between(lo, hi) => parse_cell(cell).is_some_and(|v| *lo <= v && v <= *hi),
        }
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Filters for every column of a grid, combined with AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnFilters {
    filters: Vec<Option<ColumnFilter>>,
}

impl ColumnFilters {
    /// Parse one filter text per column
    pub fn parse(texts: &[String], numeric: &[bool]) -> Self {
        let filters = texts
            .iter()
            .enumerate()
            .map(|(i, text)| ColumnFilter::parse(text, numeric.get(i).copied().unwrap_or(false)))
            .collect();
        Self { filters }
    }

    pub fn is_active(&self) -> bool {
        self.filters.iter().any(Option::is_some)
    }

    /// Whether a row of cell texts passes every column filter
    pub fn matches<S: AsRef<str>>(&self, row: &[S]) -> bool {
        self.filters.iter().enumerate().all(|(i, filter)| match filter {
            Some(filter) => row.get(i).is_some_and(|cell| filter.matches(cell.as_ref())),
            None => true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(ColumnFilter::parse("  ", true), None);
        assert_eq!(ColumnFilter::parse(">= 1990", true), Some(ColumnFilter::Compare(Comparison::Ge, 1990.0)));
        assert_eq!(ColumnFilter::parse("<50.5", true), Some(ColumnFilter::Compare(Comparison::Lt, 50.5)));
        assert_eq!(ColumnFilter::parse("=1952", true), Some(ColumnFilter::Compare(Comparison::Eq, 1952.0)));
        assert_eq!(ColumnFilter::parse("1950..1960", true), Some(ColumnFilter::Between(1950.0, 1960.0)));
        assert_eq!(ColumnFilter::parse("Asia", false), Some(ColumnFilter::Contains("asia".to_string())));
        // Operators are plain text on string columns and on bad numbers
        assert_eq!(ColumnFilter::parse(">a", false), Some(ColumnFilter::Contains(">a".to_string())));
        assert_eq!(ColumnFilter::parse("19", true), Some(ColumnFilter::Contains("19".to_string())));
    }

    #[test]
    fn test_matches() {
        let contains = ColumnFilter::parse("AFG", false).unwrap();
        assert!(contains.matches("Afghanistan"));
        assert!(!contains.matches("Albania"));

        let between = ColumnFilter::parse("1950..1960", true).unwrap();
        assert!(between.matches("1950"));
        assert!(between.matches("1960"));
        assert!(!between.matches("1962"));
        assert!(!between.matches(""));

        let greater = ColumnFilter::parse(">30", true).unwrap();
        assert!(greater.matches("30.332"));
        assert!(!greater.matches("28.801"));
    }

    #[test]
    fn test_filters_combine_with_and() {
        let texts = vec!["al".to_string(), String::new(), ">=1957".to_string()];
        let filters = ColumnFilters::parse(&texts, &[false, false, true]);
        assert!(filters.is_active());
        assert!(filters.matches(&["Albania", "Europe", "2007"]));
        assert!(!filters.matches(&["Albania", "Europe", "1952"]));
        assert!(!filters.matches(&["Angola", "Africa", "1962"]));

        let none = ColumnFilters::parse(&[String::new()], &[true]);
        assert!(!none.is_active());
        assert!(none.matches(&["anything"]));
    }
}
