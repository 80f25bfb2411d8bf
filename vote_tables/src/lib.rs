mod table;
use log::{debug, info};

use std::collections::BTreeMap;

pub use crate::table::*;

/// Collapses a precinct-grained table into one row per neighborhood.
///
/// Vote counts are reduced by sum. Coordinates are reduced by unweighted
/// arithmetic mean over the precinct rows of the group, which approximates the
/// neighborhood position by the spread of its precincts rather than by a true
/// centroid. The approximation is intentional and must not be replaced by a
/// vote-weighted mean.
///
/// The output rows are in grouped order (sorted by neighborhood name). Any
/// previously computed percentage is discarded: shares computed before
/// grouping would be per-precinct shares, so they are recomputed afterwards.
///
/// Grouping an already neighborhood-grained table is a no-op up to row order.
pub fn aggregate_by_neighborhood(table: &VoteTable) -> VoteTable {
    info!(
        "aggregate_by_neighborhood: processing {:?} precinct rows",
        table.rows.len()
    );

    // neighborhood -> (vote sum, latitude sum, longitude sum, row count)
    let mut groups: BTreeMap<String, (u64, f64, f64, u64)> = BTreeMap::new();
    for row in table.rows.iter() {
        let entry = groups
            .entry(row.neighborhood.clone())
            .or_insert((0, 0.0, 0.0, 0));
        entry.0 += row.votes;
        entry.1 += row.latitude;
        entry.2 += row.longitude;
        entry.3 += 1;
    }
    debug!(
        "aggregate_by_neighborhood: {:?} distinct neighborhoods",
        groups.len()
    );

    let rows: Vec<VoteRow> = groups
        .iter()
        .map(|(name, (votes, lat_sum, lon_sum, count))| VoteRow {
            neighborhood: name.clone(),
            votes: *votes,
            latitude: lat_sum / (*count as f64),
            longitude: lon_sum / (*count as f64),
            percent: None,
        })
        .collect();
    VoteTable::new(rows)
}

/// Computes every row's percentage share of the table's total vote count and
/// stores it in place on the same table.
///
/// For a positive total, each row receives `100 * votes / total`; the shares
/// lie in `[0, 100]` and sum to 100 up to floating-point rounding. A zero
/// total would make every share an undefined value, so it is reported as
/// [TableErrors::DegenerateTotal] instead.
///
/// ```
/// use vote_tables::{with_percentage, VoteRow, VoteTable};
///
/// let mut table = VoteTable::new(vec![
///     VoteRow::new("Centro", 150, -22.905, -43.175),
///     VoteRow::new("Copacabana", 150, -22.97, -43.19),
/// ]);
/// with_percentage(&mut table)?;
/// assert_eq!(table.rows[0].percent, Some(50.0));
/// # Ok::<(), vote_tables::TableErrors>(())
/// ```
pub fn with_percentage(table: &mut VoteTable) -> Result<(), TableErrors> {
    if table.rows.is_empty() {
        return Err(TableErrors::EmptyTable);
    }
    let total = table.total_votes();
    info!(
        "with_percentage: {:?} rows, total count {:?}",
        table.rows.len(),
        total
    );
    if total == 0 {
        return Err(TableErrors::DegenerateTotal);
    }
    for row in table.rows.iter_mut() {
        row.percent = Some(100.0 * (row.votes as f64) / (total as f64));
    }
    Ok(())
}
