use crate::pipeline::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::fs;

pub const LATITUDE_COLUMN: &str = "LATITUDE";
pub const LONGITUDE_COLUMN: &str = "LONGITUDE";

/// Where one candidate's votes come from and how the file is shaped.
///
/// The column carrying the vote counts is not the same across the files, and
/// only Pedro Porto's export is precinct-grained.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CandidateSource {
    pub name: &'static str,
    pub file_name: &'static str,
    pub neighborhood_column: &'static str,
    pub votes_column: &'static str,
    /// Marker color on the dashboard.
    pub color: &'static str,
    /// True when the file has one row per precinct and needs grouping up to
    /// neighborhood level.
    pub precinct_grained: bool,
}

pub const CANDIDATE_SOURCES: [CandidateSource; 3] = [
    CandidateSource {
        name: "Pedro Porto",
        file_name: "Relatório_de_votos_com_coordenadas.csv",
        neighborhood_column: "BAIRRO",
        votes_column: "PEDRO PORTO 2024 1T",
        color: "green",
        precinct_grained: true,
    },
    CandidateSource {
        name: "Martha Rocha",
        file_name: "martha_rocha_com_coordenadas.csv",
        neighborhood_column: "Bairro",
        votes_column: "Votos Absolutos",
        color: "blue",
        precinct_grained: false,
    },
    CandidateSource {
        name: "Ciro Gomes",
        file_name: "ciro_com_coordenadas.csv",
        neighborhood_column: "Bairro",
        votes_column: "Votos Absolutos",
        color: "red",
        precinct_grained: false,
    },
];

/// One table row as it appears in the JSON summary.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    pub neighborhood: String,
    pub votes: u64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "% VOTOS")]
    pub percent: f64,
}

pub fn read_summary(path: String) -> PipelineResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
