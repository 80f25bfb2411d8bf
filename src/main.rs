use clap::Parser;
use log::warn;
use snafu::ErrorCompat;

mod args;
mod pipeline;

use crate::args::Args;

fn main() {
    let args = Args::parse();
    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    let data_dir = args.data_dir.unwrap_or_else(|| ".".to_string());
    let res = pipeline::run_pipeline(data_dir, args.out, args.reference);
    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
