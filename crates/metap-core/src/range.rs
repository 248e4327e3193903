//! Line range selection.
//!
//! A [`RangeSelection`] restricts which constructs a pass rewrites. It is a
//! list of single lines and closed intervals; the empty list selects every
//! line. Overlapping selectors are legal, and an interval whose start is
//! after its end selects nothing.
//!
//! ```
//! use metap_core::range::{in_range, RangeSelection};
//!
//! let sel: RangeSelection = "3,7-9".parse().unwrap();
//! assert!(in_range(3, &sel));
//! assert!(in_range(9, &sel));
//! assert!(!in_range(5, &sel));
//! assert!(in_range(5, &RangeSelection::default()));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One selector: a single line, or the closed interval `[lo, hi]`.
///
/// Deserializes from `3` or `[7, 9]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selector {
    Line(u32),
    Interval(u32, u32),
}

impl Selector {
    pub fn contains(&self, line: u32) -> bool {
        match *self {
            Selector::Line(n) => n == line,
            Selector::Interval(lo, hi) => lo <= line && line <= hi,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Line(n) => write!(f, "{}", n),
            Selector::Interval(lo, hi) => write!(f, "{}-{}", lo, hi),
        }
    }
}

/// A set of selectors. Empty means "all lines".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Selector>", into = "Vec<Selector>")]
pub struct RangeSelection(Vec<Selector>);

impl RangeSelection {
    pub fn new(selectors: Vec<Selector>) -> Self {
        RangeSelection(selectors)
    }

    pub fn all() -> Self {
        RangeSelection::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn selectors(&self) -> &[Selector] {
        &self.0
    }

    pub fn contains(&self, line: u32) -> bool {
        self.0.is_empty() || self.0.iter().any(|sel| sel.contains(line))
    }
}

/// True if `line` is selected by `selection`.
pub fn in_range(line: u32, selection: &RangeSelection) -> bool {
    selection.contains(line)
}

impl From<Vec<Selector>> for RangeSelection {
    fn from(selectors: Vec<Selector>) -> Self {
        RangeSelection::new(selectors)
    }
}

impl From<RangeSelection> for Vec<Selector> {
    fn from(selection: RangeSelection) -> Self {
        selection.0
    }
}

impl fmt::Display for RangeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sel) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", sel)?;
        }
        Ok(())
    }
}

impl FromStr for RangeSelection {
    type Err = ConfigError;

    /// Parse `"3,7-9"`. Whitespace around items is ignored; an empty string
    /// is the universal selection. Reversed intervals such as `9-7` are
    /// rejected here.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidRange {
            text: text.to_string(),
            reason: reason.to_string(),
        };
        let parse_line = |s: &str| {
            s.trim()
                .parse::<u32>()
                .map_err(|_| invalid(&format!("'{}' is not a line number", s.trim())))
        };

        let mut selectors = Vec::new();
        for item in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let sel = match item.split_once('-') {
                Some((lo, hi)) => {
                    let (lo, hi) = (parse_line(lo)?, parse_line(hi)?);
                    if lo > hi {
                        return Err(invalid("interval start is after its end"));
                    }
                    Selector::Interval(lo, hi)
                }
                None => Selector::Line(parse_line(item)?),
            };
            selectors.push(sel);
        }
        Ok(RangeSelection::new(selectors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(items: &[Selector]) -> RangeSelection {
        RangeSelection::new(items.to_vec())
    }

    #[test]
    fn empty_selection_matches_everything() {
        let all = RangeSelection::all();
        for line in [0, 1, 2, 100, u32::MAX] {
            assert!(in_range(line, &all));
        }
    }

    #[test]
    fn single_lines_match_exactly() {
        let s = sel(&[Selector::Line(4), Selector::Line(10)]);
        assert!(in_range(4, &s));
        assert!(in_range(10, &s));
        assert!(!in_range(5, &s));
        assert!(!in_range(3, &s));
    }

    #[test]
    fn interval_bounds_are_inclusive() {
        let s = sel(&[Selector::Interval(7, 9)]);
        assert!(!in_range(6, &s));
        assert!(in_range(7, &s));
        assert!(in_range(8, &s));
        assert!(in_range(9, &s));
        assert!(!in_range(10, &s));
    }

    #[test]
    fn overlapping_selectors_are_redundant() {
        let s = sel(&[Selector::Interval(1, 5), Selector::Line(3), Selector::Interval(4, 6)]);
        assert!((1..=6).all(|l| in_range(l, &s)));
        assert!(!in_range(7, &s));
    }

    #[test]
    fn parse_text() {
        let s: RangeSelection = "3, 7-9".parse().unwrap();
        assert_eq!(s.selectors(), &[Selector::Line(3), Selector::Interval(7, 9)]);
        assert_eq!(s.to_string(), "3,7-9");
        assert!("".parse::<RangeSelection>().unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_garbage_and_reversed() {
        assert!("x".parse::<RangeSelection>().is_err());
        assert!("3-".parse::<RangeSelection>().is_err());
        let err = "9-7".parse::<RangeSelection>().unwrap_err();
        assert!(err.to_string().contains("9-7"), "{}", err);
    }

    #[test]
    fn serde_forms() {
        let s: RangeSelection = serde_json::from_str("[3, [7, 9]]").unwrap();
        assert_eq!(s.selectors(), &[Selector::Line(3), Selector::Interval(7, 9)]);
        assert_eq!(serde_json::to_string(&s).unwrap(), "[3,[7,9]]");
    }

    #[test]
    fn reversed_interval_selects_nothing() {
        let s: RangeSelection = serde_json::from_str("[[9, 3]]").unwrap();
        assert!((0..=12).all(|l| !in_range(l, &s)));
        let s = sel(&[Selector::Interval(9, 3), Selector::Line(5)]);
        assert!(in_range(5, &s));
        assert!(!in_range(4, &s));
    }
}
