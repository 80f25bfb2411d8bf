// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// One row of a vote table: a named area together with its vote count and its
/// geographic coordinates.
///
/// Depending on the source file, a row is either precinct-grained (several
/// rows share a neighborhood name) or already neighborhood-grained.
#[derive(PartialEq, Debug, Clone)]
pub struct VoteRow {
    /// Neighborhood name. Grouping key for precinct-grained tables.
    pub neighborhood: String,
    /// Raw vote count for this row.
    pub votes: u64,
    pub latitude: f64,
    pub longitude: f64,
    /// Share of the table total, in `[0, 100]`. `None` until the percentage
    /// computation has run on the table.
    pub percent: Option<f64>,
}

impl VoteRow {
    pub fn new(neighborhood: &str, votes: u64, latitude: f64, longitude: f64) -> VoteRow {
        VoteRow {
            neighborhood: neighborhood.to_string(),
            votes,
            latitude,
            longitude,
            percent: None,
        }
    }
}

/// A table of vote rows for a single candidate.
///
/// Lifecycle: built once from a source file, transformed by
/// [aggregate_by_neighborhood](crate::aggregate_by_neighborhood) when the
/// source is precinct-grained, then mutated in place by
/// [with_percentage](crate::with_percentage), then read-only.
#[derive(PartialEq, Debug, Clone)]
pub struct VoteTable {
    pub rows: Vec<VoteRow>,
}

impl VoteTable {
    pub fn new(rows: Vec<VoteRow>) -> VoteTable {
        VoteTable { rows }
    }

    /// Total number of votes across all rows.
    pub fn total_votes(&self) -> u64 {
        self.rows.iter().map(|r| r.votes).sum()
    }
}

// ********* Errors **********

/// Errors that prevent the share computation from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TableErrors {
    /// The table has no rows at all.
    EmptyTable,
    /// The total vote count is zero, so percentage shares are undefined.
    /// This is reported instead of letting a division by zero propagate NaN
    /// values into the output.
    DegenerateTotal,
}

impl Error for TableErrors {}

impl Display for TableErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableErrors::EmptyTable => write!(f, "TableError: the table has no rows"),
            TableErrors::DegenerateTotal => {
                write!(f, "TableError: the total vote count is zero")
            }
        }
    }
}
