//! Record search over the in-memory history list.
//!
//! A pure, synchronous predicate: given a fetched record and the current
//! query (free-text term, optional target column, match mode), decide
//! whether the record stays visible. It performs no I/O, keeps no state,
//! and never fails; unparseable numeric terms degrade to "no match" the
//! way a user-facing search box should. Cheap enough to re-run on every
//! keystroke over a single user's history.

mod range;

pub use range::RangeTerm;
use range::{parse_range_term, RangeParse};

use crate::records::{Column, ColumnKind, PredictionRecord};

/// How text comparison treats the search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Rendered value must contain the term as a substring.
    #[default]
    Contains,
    /// Rendered value must equal the term exactly.
    Exact,
}

/// Which columns a query evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnSelector {
    /// Every searchable column, OR-combined.
    #[default]
    AllColumns,
    /// One column only.
    Single(Column),
    /// A restriction label that maps to no column; matches nothing.
    Unrecognized,
}

impl ColumnSelector {
    /// Parse a column choice from the UI's label string.
    ///
    /// Empty, "all", and "all columns" select every column; a known
    /// header label selects that column; anything else matches nothing.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        if normalized.is_empty() || normalized == "all" || normalized == "all columns" {
            return ColumnSelector::AllColumns;
        }
        match Column::from_label(&normalized) {
            Some(column) => ColumnSelector::Single(column),
            None => ColumnSelector::Unrecognized,
        }
    }
}

/// The user's current search input.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Free-text search term. The empty string matches every record.
    pub term: String,
    /// Column restriction.
    pub column: ColumnSelector,
    /// Text comparison mode.
    pub mode: MatchMode,
}

impl Query {
    /// A contains-mode query over all columns.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            column: ColumnSelector::AllColumns,
            mode: MatchMode::Contains,
        }
    }

    /// Restrict evaluation to one column.
    pub fn in_column(mut self, column: Column) -> Self {
        self.column = ColumnSelector::Single(column);
        self
    }

    /// Restrict evaluation by a column label string from the UI.
    pub fn with_column_label(mut self, label: &str) -> Self {
        self.column = ColumnSelector::from_label(label);
        self
    }

    /// Switch to exact text matching.
    pub fn exact(mut self) -> Self {
        self.mode = MatchMode::Exact;
        self
    }
}

/// Decide whether one record satisfies the query.
pub fn matches(record: &PredictionRecord, query: &Query) -> bool {
    if query.term.is_empty() {
        return true;
    }
    let term = query.term.to_lowercase();
    let range = parse_range_term(&term);
    eval_record(record, &term, range, query.column, query.mode)
}

/// Filter a fetched list, preserving fetch order.
///
/// The term is normalized and its range syntax parsed once for the whole
/// pass; each record is then a cheap predicate evaluation.
pub fn filter_records<'a>(
    records: &'a [PredictionRecord],
    query: &Query,
) -> Vec<&'a PredictionRecord> {
    if query.term.is_empty() {
        return records.iter().collect();
    }
    let term = query.term.to_lowercase();
    let range = parse_range_term(&term);
    records
        .iter()
        .filter(|record| eval_record(record, &term, range, query.column, query.mode))
        .collect()
}

fn eval_record(
    record: &PredictionRecord,
    term: &str,
    range: RangeParse,
    column: ColumnSelector,
    mode: MatchMode,
) -> bool {
    match column {
        ColumnSelector::AllColumns => Column::ALL
            .iter()
            .any(|c| eval_column(*c, record, term, range, mode)),
        ColumnSelector::Single(c) => eval_column(c, record, term, range, mode),
        ColumnSelector::Unrecognized => false,
    }
}

fn eval_column(
    column: Column,
    record: &PredictionRecord,
    term: &str,
    range: RangeParse,
    mode: MatchMode,
) -> bool {
    match column.kind() {
        // Coded columns compare their rendered words only; range syntax
        // never applies even though sex has a numeric code underneath.
        ColumnKind::Categorical | ColumnKind::Outcome => {
            text_matches(&column.rendered_value(record), term, mode)
        }
        ColumnKind::Numeric => match range {
            RangeParse::Range(range) => match column.numeric_value(record) {
                Some(value) => range.contains_value(value),
                None => false,
            },
            RangeParse::Malformed => false,
            RangeParse::NotRange => text_matches(&column.rendered_value(record), term, mode),
        },
    }
}

fn text_matches(rendered: &str, term: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Exact => rendered == term,
        MatchMode::Contains => rendered.contains(term),
    }
}
