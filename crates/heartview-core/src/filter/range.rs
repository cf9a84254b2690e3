//! Numeric-range search term parsing.
//!
//! Three term forms carry a numeric comparator: `>N`, `<N`, and `min-max`.
//! A term that uses comparator syntax with bounds that do not parse as
//! numbers is malformed; malformed terms never match and never error.

/// A successfully parsed numeric-range term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeTerm {
    /// `>N`: strictly greater than.
    GreaterThan(f64),
    /// `<N`: strictly less than.
    LessThan(f64),
    /// `min-max`: inclusive on both ends. Reversed bounds form an empty
    /// range that matches nothing.
    Between(f64, f64),
}

impl RangeTerm {
    /// Whether a field value satisfies this range.
    pub fn contains_value(&self, value: f64) -> bool {
        match self {
            RangeTerm::GreaterThan(n) => value > *n,
            RangeTerm::LessThan(n) => value < *n,
            RangeTerm::Between(lo, hi) => value >= *lo && value <= *hi,
        }
    }
}

/// Outcome of inspecting a search term for range syntax.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RangeParse {
    /// No comparator syntax present; compare as plain text instead.
    NotRange,
    /// Comparator syntax present but a bound failed to parse. Numeric
    /// fields treat this as "does not match"; there is no text fallback.
    Malformed,
    Range(RangeTerm),
}

/// Inspect a search term for numeric-range syntax.
///
/// The term arrives lowercased and untrimmed; bounds tolerate inner
/// padding (`"> 150"`) but a leading space defeats the prefix check,
/// same as the search box this mirrors. A bound must parse fully as a
/// number: `">150mg"` is malformed, not `> 150`.
pub(crate) fn parse_range_term(term: &str) -> RangeParse {
    if let Some(rest) = term.strip_prefix('>') {
        return match parse_bound(rest) {
            Some(n) => RangeParse::Range(RangeTerm::GreaterThan(n)),
            None => RangeParse::Malformed,
        };
    }
    if let Some(rest) = term.strip_prefix('<') {
        return match parse_bound(rest) {
            Some(n) => RangeParse::Range(RangeTerm::LessThan(n)),
            None => RangeParse::Malformed,
        };
    }
    if let Some((lo, hi)) = term.split_once('-') {
        return match (parse_bound(lo), parse_bound(hi)) {
            (Some(lo), Some(hi)) => RangeParse::Range(RangeTerm::Between(lo, hi)),
            _ => RangeParse::Malformed,
        };
    }
    RangeParse::NotRange
}

fn parse_bound(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_greater_than() {
        assert_eq!(
            parse_range_term(">150"),
            RangeParse::Range(RangeTerm::GreaterThan(150.0))
        );
        assert_eq!(
            parse_range_term("> 150"),
            RangeParse::Range(RangeTerm::GreaterThan(150.0))
        );
    }

    #[test]
    fn test_parse_less_than() {
        assert_eq!(
            parse_range_term("<99.5"),
            RangeParse::Range(RangeTerm::LessThan(99.5))
        );
    }

    #[test]
    fn test_parse_between() {
        assert_eq!(
            parse_range_term("190-210"),
            RangeParse::Range(RangeTerm::Between(190.0, 210.0))
        );
    }

    #[test]
    fn test_parse_negative_bound_after_comparator() {
        assert_eq!(
            parse_range_term(">-5"),
            RangeParse::Range(RangeTerm::GreaterThan(-5.0))
        );
    }

    #[test]
    fn test_plain_text_terms_are_not_ranges() {
        assert_eq!(parse_range_term("120"), RangeParse::NotRange);
        assert_eq!(parse_range_term("male"), RangeParse::NotRange);
        assert_eq!(parse_range_term(""), RangeParse::NotRange);
    }

    #[test]
    fn test_malformed_comparators() {
        assert_eq!(parse_range_term(">abc"), RangeParse::Malformed);
        assert_eq!(parse_range_term(">150mg"), RangeParse::Malformed);
        assert_eq!(parse_range_term("abc-5"), RangeParse::Malformed);
        assert_eq!(parse_range_term("5-"), RangeParse::Malformed);
        assert_eq!(parse_range_term("-"), RangeParse::Malformed);
        // A bare negative number reads as a dash range with an empty
        // left bound, so it is malformed rather than a numeric probe.
        assert_eq!(parse_range_term("-1.5"), RangeParse::Malformed);
    }

    #[test]
    fn test_greater_and_less_are_strict() {
        let gt = RangeTerm::GreaterThan(150.0);
        assert!(gt.contains_value(150.1));
        assert!(!gt.contains_value(150.0));

        let lt = RangeTerm::LessThan(150.0);
        assert!(lt.contains_value(149.9));
        assert!(!lt.contains_value(150.0));
    }

    #[test]
    fn test_between_is_inclusive() {
        let range = RangeTerm::Between(190.0, 210.0);
        assert!(range.contains_value(190.0));
        assert!(range.contains_value(210.0));
        assert!(range.contains_value(200.0));
        assert!(!range.contains_value(189.9));
        assert!(!range.contains_value(210.1));
    }

    #[test]
    fn test_reversed_bounds_match_nothing() {
        let range = RangeTerm::Between(210.0, 190.0);
        assert!(!range.contains_value(200.0));
        assert!(!range.contains_value(210.0));
        assert!(!range.contains_value(190.0));
    }
}
