//! A compact range/value-set selector over integer indices.
//!
//! Used to filter timesteps and blocks (e.g. the chunked file reader's
//! `(start, stop, step)` selection, or a cache module's UI-facing "which
//! steps to keep" parameter). The restraint string grammar is a
//! comma-separated list of either a single value (`"15"`) or a range
//! `"min-max"` / `"min-max:step"`. An empty string or the literal `"all"`
//! selects everything.

use std::fmt::Write as _;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Range {
    min: i64,
    max: i64,
    step: i64,
}

impl Range {
    fn contains(&self, value: i64) -> bool {
        if value < self.min || value > self.max {
            return false;
        }
        (value - self.min) % self.step == 0
    }
}

/// A parsed restraint: either "everything" or a set of ranges/values.
#[derive(Clone, Debug, Default)]
pub struct Restraint {
    all: bool,
    ranges: Vec<Range>,
}

/// Error parsing a restraint string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestraintParseError(pub String);

impl std::fmt::Display for RestraintParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid restraint clause: {}", self.0)
    }
}

impl std::error::Error for RestraintParseError {}

impl Restraint {
    /// A restraint that selects every value.
    pub fn all() -> Self {
        Restraint { all: true, ranges: Vec::new() }
    }

    /// An empty restraint that selects nothing.
    pub fn empty() -> Self {
        Restraint { all: false, ranges: Vec::new() }
    }

    /// Adds a single value to the selection.
    pub fn add_value(&mut self, value: i64) {
        self.ranges.push(Range { min: value, max: value, step: 1 });
    }

    /// Adds an inclusive range `[min, max]` with the given stride.
    pub fn add_range(&mut self, min: i64, max: i64, step: i64) {
        let step = step.max(1);
        self.ranges.push(Range { min, max, step });
    }

    /// Parses the restraint grammar described in the module docs.
    pub fn parse(s: &str) -> Result<Self, RestraintParseError> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(Restraint::all());
        }
        let mut r = Restraint::empty();
        for clause in s.split(',') {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }
            if let Some((range, step)) = clause.split_once(':') {
                let (min, max) = parse_bounds(range, clause)?;
                let step: i64 = step
                    .trim()
                    .parse()
                    .map_err(|_| RestraintParseError(clause.to_string()))?;
                r.add_range(min, max, step);
            } else if let Some(_dash) = clause[1..].find('-').map(|i| i + 1) {
                let (min, max) = parse_bounds(clause, clause)?;
                r.add_range(min, max, 1);
            } else {
                let v: i64 = clause
                    .parse()
                    .map_err(|_| RestraintParseError(clause.to_string()))?;
                r.add_value(v);
            }
        }
        Ok(r)
    }

    /// Whether `value` is selected by this restraint.
    pub fn contains(&self, value: i64) -> bool {
        if self.all {
            return true;
        }
        self.ranges.iter().any(|r| r.contains(value))
    }

    /// The smallest selected value, or `i64::MAX` if nothing is selected
    /// and this restraint is not `all`.
    pub fn lower(&self) -> i64 {
        if self.all {
            return i64::MIN;
        }
        self.ranges.iter().map(|r| r.min).min().unwrap_or(i64::MAX)
    }

    /// The largest selected value, or `i64::MIN` if nothing is selected
    /// and this restraint is not `all`.
    pub fn upper(&self) -> i64 {
        if self.all {
            return i64::MAX;
        }
        self.ranges.iter().map(|r| r.max).max().unwrap_or(i64::MIN)
    }

    /// Renders the restraint back to its string grammar.
    pub fn to_restraint_string(&self) -> String {
        if self.all {
            return "all".to_string();
        }
        let mut out = String::new();
        for (i, r) in self.ranges.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if r.min == r.max {
                let _ = write!(out, "{}", r.min);
            } else if r.step == 1 {
                let _ = write!(out, "{}-{}", r.min, r.max);
            } else {
                let _ = write!(out, "{}-{}:{}", r.min, r.max, r.step);
            }
        }
        out
    }
}

fn parse_bounds(range: &str, clause: &str) -> Result<(i64, i64), RestraintParseError> {
    // Skip a leading '-' when looking for the separator so that a negative
    // lower bound (e.g. "-5-10") is not split at the wrong dash.
    let search_from = if range.starts_with('-') { 1 } else { 0 };
    let dash = range[search_from..]
        .find('-')
        .map(|i| i + search_from)
        .ok_or_else(|| RestraintParseError(clause.to_string()))?;
    let min: i64 = range[..dash]
        .parse()
        .map_err(|_| RestraintParseError(clause.to_string()))?;
    let max: i64 = range[dash + 1..]
        .parse()
        .map_err(|_| RestraintParseError(clause.to_string()))?;
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all() {
        let r = Restraint::parse("").unwrap();
        assert!(r.contains(0));
        assert!(r.contains(-1000));
        assert_eq!(Restraint::parse("all").unwrap().contains(42), true);
    }

    #[test]
    fn parses_mixed_clauses() {
        let r = Restraint::parse("0-10:2,15,20-25").unwrap();
        assert!(r.contains(0));
        assert!(r.contains(2));
        assert!(!r.contains(3));
        assert!(r.contains(15));
        assert!(!r.contains(16));
        assert!(r.contains(22));
        assert!(!r.contains(26));
    }

    #[test]
    fn round_trips_through_string() {
        let r = Restraint::parse("0-10:2,15,20-25").unwrap();
        let s = r.to_restraint_string();
        let r2 = Restraint::parse(&s).unwrap();
        for v in -5..30 {
            assert_eq!(r.contains(v), r2.contains(v));
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(Restraint::parse("not-a-number").is_err());
    }
}
