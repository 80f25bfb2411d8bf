//! Renderer for the dashboard page: one self-contained HTML document with a
//! dropdown switching between the per-candidate maps.
//!
//! Deterministic: the same tables produce identical bytes. The page itself
//! only reaches the network for the Leaflet assets and the OpenStreetMap
//! tiles.

use serde::Serialize;
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use snafu::prelude::*;

use std::fs;
use std::path::Path;

use crate::pipeline::*;

/// Approximate center of the city of Rio de Janeiro.
pub const MAP_CENTER: (f64, f64) = (-22.9068, -43.1729);
pub const MAP_ZOOM: u32 = 10;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// One marker as embedded in the page.
#[derive(PartialEq, Debug, Clone, Serialize)]
struct MarkerRow {
    name: String,
    votes: u64,
    lat: f64,
    lon: f64,
    pct: f64,
}

// Minimal writer with deterministic push order.
struct Html {
    buf: String,
}

impl Html {
    fn new() -> Html {
        Html {
            buf: String::with_capacity(16 * 1024),
        }
    }
    fn push<S: AsRef<str>>(&mut self, s: S) {
        self.buf.push_str(s.as_ref());
    }
    fn finish(self) -> String {
        self.buf
    }
}

fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn marker_data(tables: &[CandidateTable]) -> PipelineResult<String> {
    let mut datasets: JSMap<String, JSValue> = JSMap::new();
    for ct in tables.iter() {
        let markers: Vec<MarkerRow> = ct
            .table
            .rows
            .iter()
            .map(|r| MarkerRow {
                name: esc(&r.neighborhood),
                votes: r.votes,
                lat: r.latitude,
                lon: r.longitude,
                pct: r.percent.unwrap_or_default(),
            })
            .collect();
        datasets.insert(
            ct.source.name.to_string(),
            json!({ "color": ct.source.color, "markers": markers }),
        );
    }
    let data_js =
        serde_json::to_string(&JSValue::Object(datasets)).context(ParsingJsonSnafu {})?;
    // "</" inside the inline script would close the tag early.
    Ok(data_js.replace("</", "<\\/"))
}

pub fn render_dashboard(tables: &[CandidateTable]) -> PipelineResult<String> {
    let mut w = Html::new();

    w.push("<!DOCTYPE html><html lang=\"pt-BR\"><head><meta charset=\"utf-8\">");
    w.push("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
    w.push("<title>Mapas de votação ajustados para proporção de votos</title>");
    w.push(format!("<link rel=\"stylesheet\" href=\"{}\">", LEAFLET_CSS));
    w.push(format!("<script src=\"{}\"></script>", LEAFLET_JS));
    w.push(
        "<style>\
         body{font-family:sans-serif;margin:0 auto;max-width:64em;padding:0 1em}\
         h1{font-size:1.4em}\
         #mapa{margin:0 0 .8em .5em}\
         #map{height:80vh;border:1px solid #ccc}\
         </style>",
    );
    w.push("</head><body>");
    w.push("<h1>Mapas de votação ajustados para proporção de votos</h1>");
    w.push("<label for=\"mapa\">Escolha um mapa para visualizar</label>");
    w.push("<select id=\"mapa\">");
    for ct in tables.iter() {
        let name = esc(ct.source.name);
        w.push(format!("<option value=\"{}\">{}</option>", name, name));
    }
    w.push("</select>");
    w.push("<div id=\"map\"></div>");

    w.push("<script>var datasets = ");
    w.push(marker_data(tables)?);
    w.push(";\n");
    w.push(format!(
        "var map = L.map('map').setView([{}, {}], {});\n",
        MAP_CENTER.0, MAP_CENTER.1, MAP_ZOOM
    ));
    w.push(
        "L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {\n\
         \x20 attribution: '&copy; OpenStreetMap contributors'\n\
         }).addTo(map);\n\
         var layer = L.layerGroup().addTo(map);\n\
         function show(name) {\n\
         \x20 layer.clearLayers();\n\
         \x20 var d = datasets[name];\n\
         \x20 d.markers.forEach(function (m) {\n\
         \x20   L.circleMarker([m.lat, m.lon], {\n\
         \x20     radius: Math.min(25, 2 + m.pct * 2.5),\n\
         \x20     color: d.color,\n\
         \x20     fillColor: d.color,\n\
         \x20     fillOpacity: 0.5\n\
         \x20   }).bindTooltip(\n\
         \x20     '<b>' + m.name + '</b><br>Votos: ' + m.votes +\n\
         \x20     '<br>% VOTOS: ' + m.pct.toFixed(2) + '%'\n\
         \x20   ).addTo(layer);\n\
         \x20 });\n\
         }\n\
         var select = document.getElementById('mapa');\n\
         select.addEventListener('change', function () { show(select.value); });\n\
         show(select.value);\n",
    );
    w.push("</script></body></html>");

    Ok(w.finish())
}

pub fn write_dashboard(path: &Path, tables: &[CandidateTable]) -> PipelineResult<()> {
    let page = render_dashboard(tables)?;
    fs::write(path, page).context(WritingDashboardSnafu {
        path: path.display().to_string(),
    })
}
