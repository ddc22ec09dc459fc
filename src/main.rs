//! `audiowaveform` command line tool
//!
//! Generates waveform data from WAV audio, and converts or rescales existing
//! `.dat` / `.json` waveform data.

mod cli;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let options = cli::Options::parse();
    cli::init_logger(options.quiet);

    match cli::run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
