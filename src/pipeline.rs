use log::{error, info, warn};

use snafu::{prelude::*, Snafu};

use std::path::PathBuf;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;
use vote_tables::{aggregate_by_neighborhood, with_percentage, VoteTable};

pub mod dashboard;
pub mod io_common;
pub mod io_csv;
pub mod sources;

use crate::pipeline::io_common::simplify_file_name;
pub use crate::pipeline::sources::*;

/// File name of the dashboard page, written next to the inputs by default.
pub const DASHBOARD_FILE_NAME: &str = "mapas_votacao.html";

#[derive(Debug, Snafu)]
pub enum PipelineError {
    #[snafu(display("The following input files were not found: {paths:?}"))]
    MissingInputs { paths: Vec<String> },

    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a CSV record in {path}"))]
    CsvParse { source: csv::Error, path: String },
    #[snafu(display("Missing column {column:?} in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Line {lineno} of {path} has too few fields"))]
    CsvLineTooShort { lineno: usize, path: String },
    #[snafu(display(
        "Cannot read {value:?} as a number for column {column:?} at line {lineno} of {path}"
    ))]
    ParsingNumber {
        value: String,
        column: String,
        lineno: usize,
        path: String,
    },

    #[snafu(display("Cannot compute the vote shares for candidate {candidate}"))]
    ShareComputation {
        source: vote_tables::TableErrors,
        candidate: String,
    },

    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the dashboard page to {path}"))]
    WritingDashboard {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// A finished table for one candidate: loaded, aggregated when the source is
/// precinct-grained, and carrying the percentage shares.
#[derive(Debug, Clone)]
pub struct CandidateTable {
    pub source: CandidateSource,
    pub table: VoteTable,
}

/// Checks that the three input files are present under `root`.
///
/// All three are checked before giving up, so one run reports every missing
/// file at once.
fn check_inputs(root: &str) -> PipelineResult<()> {
    let mut missing: Vec<String> = Vec::new();
    for source in CANDIDATE_SOURCES.iter() {
        let p = io_common::input_path(root, source.file_name);
        if !p.is_file() {
            error!(
                "The input file {:?} was not found. Place it in the data directory.",
                p
            );
            missing.push(p.display().to_string());
        }
    }
    ensure!(missing.is_empty(), MissingInputsSnafu { paths: missing });
    Ok(())
}

/// Runs the three stages for one candidate: load, group when precinct-grained,
/// compute percentage shares.
pub fn process_candidate(root: &str, source: &CandidateSource) -> PipelineResult<CandidateTable> {
    let path = io_common::input_path(root, source.file_name);
    let p = path.display().to_string();
    info!("Attempting to read vote file {:?}", p);
    let mut table = io_csv::read_vote_table(&p, source)?;
    if source.precinct_grained {
        table = aggregate_by_neighborhood(&table);
    }
    // The shares are computed after grouping; the other order would produce
    // per-precinct shares.
    with_percentage(&mut table).context(ShareComputationSnafu {
        candidate: source.name,
    })?;
    Ok(CandidateTable {
        source: source.clone(),
        table,
    })
}

fn build_summary_js(tables: &[CandidateTable]) -> JSValue {
    let mut candidates: Vec<JSValue> = Vec::new();
    for ct in tables.iter() {
        let rows: Vec<SummaryRow> = ct
            .table
            .rows
            .iter()
            .map(|r| SummaryRow {
                neighborhood: r.neighborhood.clone(),
                votes: r.votes,
                latitude: r.latitude,
                longitude: r.longitude,
                percent: r.percent.unwrap_or_default(),
            })
            .collect();
        candidates.push(json!({
            "candidate": ct.source.name,
            "file": simplify_file_name(ct.source.file_name),
            "totalVotes": ct.table.total_votes().to_string(),
            "rows": rows,
        }));
    }
    json!({ "candidates": candidates })
}

/// Loads the three candidate files from `data_dir`, computes the tables and
/// writes the dashboard page.
///
/// Nothing is rendered unless all three candidates load and compute cleanly:
/// a partial dashboard would silently misrepresent the election.
pub fn run_pipeline(
    data_dir: String,
    out_path: Option<String>,
    reference_path: Option<String>,
) -> PipelineResult<()> {
    check_inputs(&data_dir)?;

    let mut tables: Vec<CandidateTable> = Vec::new();
    for source in CANDIDATE_SOURCES.iter() {
        tables.push(process_candidate(&data_dir, source)?);
    }

    let summary_js = build_summary_js(&tables);
    let pretty_js_summary = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
    println!("summary:{}", pretty_js_summary);

    // The reference summary, if provided for comparison
    if let Some(reference_p) = reference_path {
        let reference_js = read_summary(reference_p)?;
        let pretty_js_reference =
            serde_json::to_string_pretty(&reference_js).context(ParsingJsonSnafu {})?;
        if pretty_js_reference != pretty_js_summary {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_reference.as_str(),
                pretty_js_summary.as_ref(),
                "\n",
            );
            whatever!("Difference detected between computed tables and reference summary");
        }
    }

    let out = out_path
        .map(PathBuf::from)
        .unwrap_or_else(|| io_common::input_path(&data_dir, DASHBOARD_FILE_NAME));
    dashboard::write_dashboard(&out, &tables)?;
    info!("Dashboard written to {:?}", out);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const PEDRO_CSV: &str = "\
BAIRRO,ZONA,PEDRO PORTO 2024 1T,LATITUDE,LONGITUDE
Centro,1,100,-22.90,-43.17
Centro,2,50,-22.91,-43.18
Copacabana,3,150,-22.97,-43.19
";

    const MARTHA_CSV: &str = "\
Bairro,Votos Absolutos,LATITUDE,LONGITUDE
Centro,80,-22.905,-43.175
Copacabana,20,-22.97,-43.19
";

    const CIRO_CSV: &str = "\
Bairro,Votos Absolutos,LATITUDE,LONGITUDE
Centro,30,-22.905,-43.175
Copacabana,70.0,-22.97,-43.19
";

    fn write_inputs(dir: &Path) {
        fs::write(dir.join("Relatório_de_votos_com_coordenadas.csv"), PEDRO_CSV).unwrap();
        fs::write(dir.join("martha_rocha_com_coordenadas.csv"), MARTHA_CSV).unwrap();
        fs::write(dir.join("ciro_com_coordenadas.csv"), CIRO_CSV).unwrap();
    }

    fn root_str(dir: &TempDir) -> String {
        dir.path().display().to_string()
    }

    #[test]
    fn precinct_file_is_grouped_before_shares() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        let ct = process_candidate(&root_str(&dir), &CANDIDATE_SOURCES[0]).unwrap();
        assert_eq!(ct.table.rows.len(), 2);
        let centro = &ct.table.rows[0];
        assert_eq!(centro.neighborhood, "Centro");
        assert_eq!(centro.votes, 150);
        assert!((centro.latitude - (-22.905)).abs() < 1e-9);
        assert_eq!(centro.percent, Some(50.0));
        assert_eq!(ct.table.rows[1].percent, Some(50.0));
    }

    #[test]
    fn neighborhood_file_keeps_its_rows() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        let ct = process_candidate(&root_str(&dir), &CANDIDATE_SOURCES[1]).unwrap();
        assert_eq!(ct.table.rows.len(), 2);
        assert_eq!(ct.table.rows[0].percent, Some(80.0));
        assert_eq!(ct.table.rows[1].percent, Some(20.0));
    }

    #[test]
    fn float_typed_counts_are_accepted() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        let ct = process_candidate(&root_str(&dir), &CANDIDATE_SOURCES[2]).unwrap();
        assert_eq!(ct.table.rows[1].votes, 70);
        assert_eq!(ct.table.rows[1].percent, Some(70.0));
    }

    #[test]
    fn pipeline_writes_the_dashboard() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        run_pipeline(root_str(&dir), None, None).unwrap();
        let page = fs::read_to_string(dir.path().join(DASHBOARD_FILE_NAME)).unwrap();
        assert!(page.contains("Pedro Porto"));
        assert!(page.contains("Martha Rocha"));
        assert!(page.contains("Ciro Gomes"));
        assert!(page.contains("circleMarker"));
        assert!(page.contains("-22.9068"));
    }

    #[test]
    fn one_missing_file_halts_the_whole_run() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        fs::remove_file(dir.path().join("ciro_com_coordenadas.csv")).unwrap();
        let res = run_pipeline(root_str(&dir), None, None);
        match res {
            Err(PipelineError::MissingInputs { paths }) => {
                assert_eq!(paths.len(), 1);
                assert!(paths[0].contains("ciro_com_coordenadas.csv"));
            }
            x => panic!("unexpected result: {:?}", x),
        }
        assert!(!dir.path().join(DASHBOARD_FILE_NAME).exists());
    }

    #[test]
    fn every_missing_file_is_reported() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        fs::remove_file(dir.path().join("martha_rocha_com_coordenadas.csv")).unwrap();
        fs::remove_file(dir.path().join("ciro_com_coordenadas.csv")).unwrap();
        match run_pipeline(root_str(&dir), None, None) {
            Err(PipelineError::MissingInputs { paths }) => assert_eq!(paths.len(), 2),
            x => panic!("unexpected result: {:?}", x),
        }
    }

    #[test]
    fn zero_total_votes_halts_the_run() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        fs::write(
            dir.path().join("martha_rocha_com_coordenadas.csv"),
            "Bairro,Votos Absolutos,LATITUDE,LONGITUDE\nCentro,0,-22.905,-43.175\nCopacabana,0,-22.97,-43.19\n",
        )
        .unwrap();
        match run_pipeline(root_str(&dir), None, None) {
            Err(PipelineError::ShareComputation { candidate, source }) => {
                assert_eq!(candidate, "Martha Rocha");
                assert_eq!(source, vote_tables::TableErrors::DegenerateTotal);
            }
            x => panic!("unexpected result: {:?}", x),
        }
        assert!(!dir.path().join(DASHBOARD_FILE_NAME).exists());
    }

    #[test]
    fn missing_column_is_reported_with_its_name() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        fs::write(
            dir.path().join("ciro_com_coordenadas.csv"),
            "Bairro,Votos,LATITUDE,LONGITUDE\nCentro,30,-22.905,-43.175\n",
        )
        .unwrap();
        match process_candidate(&root_str(&dir), &CANDIDATE_SOURCES[2]) {
            Err(PipelineError::MissingColumn { column, .. }) => {
                assert_eq!(column, "Votos Absolutos");
            }
            x => panic!("unexpected result: {:?}", x),
        }
    }

    #[test]
    fn unparseable_count_is_reported_with_its_line() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        fs::write(
            dir.path().join("ciro_com_coordenadas.csv"),
            "Bairro,Votos Absolutos,LATITUDE,LONGITUDE\nCentro,30,-22.905,-43.175\nCopacabana,n/a,-22.97,-43.19\n",
        )
        .unwrap();
        match process_candidate(&root_str(&dir), &CANDIDATE_SOURCES[2]) {
            Err(PipelineError::ParsingNumber {
                value,
                column,
                lineno,
                ..
            }) => {
                assert_eq!(value, "n/a");
                assert_eq!(column, "Votos Absolutos");
                assert_eq!(lineno, 3);
            }
            x => panic!("unexpected result: {:?}", x),
        }
    }

    #[test]
    fn negative_counts_are_rejected() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        fs::write(
            dir.path().join("ciro_com_coordenadas.csv"),
            "Bairro,Votos Absolutos,LATITUDE,LONGITUDE\nCentro,-5,-22.905,-43.175\n",
        )
        .unwrap();
        assert!(matches!(
            process_candidate(&root_str(&dir), &CANDIDATE_SOURCES[2]),
            Err(PipelineError::ParsingNumber { .. })
        ));
    }

    #[test]
    fn matching_reference_passes_the_check() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        let tables: Vec<CandidateTable> = CANDIDATE_SOURCES
            .iter()
            .map(|s| process_candidate(&root_str(&dir), s).unwrap())
            .collect();
        let reference = serde_json::to_string_pretty(&build_summary_js(&tables)).unwrap();
        let reference_p = dir.path().join("reference_summary.json");
        fs::write(&reference_p, reference).unwrap();
        run_pipeline(
            root_str(&dir),
            None,
            Some(reference_p.display().to_string()),
        )
        .unwrap();
    }

    #[test]
    fn mismatching_reference_fails_the_check() {
        let dir = TempDir::new().unwrap();
        write_inputs(dir.path());
        let reference_p = dir.path().join("reference_summary.json");
        fs::write(&reference_p, "{\"candidates\": []}").unwrap();
        let res = run_pipeline(
            root_str(&dir),
            None,
            Some(reference_p.display().to_string()),
        );
        assert!(matches!(res, Err(PipelineError::Whatever { .. })));
    }
}
