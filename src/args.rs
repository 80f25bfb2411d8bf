use clap::Parser;

/// This program builds the neighborhood vote-share maps for the three Rio de
/// Janeiro candidate datasets.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (directory path, optional) The directory containing the three vote CSV files.
    /// If not specified, the files are looked up in the current working directory.
    #[clap(short, long, value_parser)]
    pub data_dir: Option<String>,

    /// (file path or empty) If specified, the dashboard page will be written to the given
    /// location. The default is `mapas_votacao.html` inside the data directory.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the expected tables in JSON format. If provided,
    /// votomapa will check that the computed tables match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
