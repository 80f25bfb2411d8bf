// Primitives for reading the vote CSV files.

use log::debug;

use csv::StringRecord;
use snafu::prelude::*;

use crate::pipeline::*;
use vote_tables::{VoteRow, VoteTable};

/// Reads one candidate file into a typed table.
///
/// The four columns named by the source descriptor are located through the
/// header row; extra columns are ignored. Every cell is validated here, so the
/// rest of the pipeline never sees an untyped value.
pub fn read_vote_table(path: &str, source: &CandidateSource) -> PipelineResult<VoteTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let headers = rdr.headers().context(CsvParseSnafu { path })?.clone();
    debug!("header: {:?}", headers);

    let neighborhood_idx = find_column(&headers, source.neighborhood_column, path)?;
    let votes_idx = find_column(&headers, source.votes_column, path)?;
    let latitude_idx = find_column(&headers, LATITUDE_COLUMN, path)?;
    let longitude_idx = find_column(&headers, LONGITUDE_COLUMN, path)?;

    let mut rows: Vec<VoteRow> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        // The header occupies line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvParseSnafu { path })?;
        debug!("{:?} {:?}", lineno, line);
        let neighborhood = get_field(&line, neighborhood_idx, lineno, path)?
            .trim()
            .to_string();
        let votes = parse_count(
            get_field(&line, votes_idx, lineno, path)?,
            source.votes_column,
            lineno,
            path,
        )?;
        let latitude = parse_coordinate(
            get_field(&line, latitude_idx, lineno, path)?,
            LATITUDE_COLUMN,
            lineno,
            path,
        )?;
        let longitude = parse_coordinate(
            get_field(&line, longitude_idx, lineno, path)?,
            LONGITUDE_COLUMN,
            lineno,
            path,
        )?;
        rows.push(VoteRow {
            neighborhood,
            votes,
            latitude,
            longitude,
            percent: None,
        });
    }
    Ok(VoteTable::new(rows))
}

fn find_column(headers: &StringRecord, column: &str, path: &str) -> PipelineResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .context(MissingColumnSnafu { column, path })
}

fn get_field<'a>(
    line: &'a StringRecord,
    idx: usize,
    lineno: usize,
    path: &str,
) -> PipelineResult<&'a str> {
    line.get(idx).context(CsvLineTooShortSnafu { lineno, path })
}

fn parse_count(s: &str, column: &str, lineno: usize, path: &str) -> PipelineResult<u64> {
    let t = s.trim();
    if let Ok(x) = t.parse::<u64>() {
        return Ok(x);
    }
    // Spreadsheet exports routinely type integer columns as floats ("150.0").
    match t.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
        _ => ParsingNumberSnafu {
            value: t,
            column,
            lineno,
            path,
        }
        .fail(),
    }
}

fn parse_coordinate(s: &str, column: &str, lineno: usize, path: &str) -> PipelineResult<f64> {
    let t = s.trim();
    t.parse::<f64>().ok().context(ParsingNumberSnafu {
        value: t,
        column,
        lineno,
        path,
    })
}
