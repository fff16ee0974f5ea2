//! CLI entry point for the volume preprocessing pipeline

use clap::Parser;
use std::process::ExitCode;
use volprep::io::cli::{Cli, VolumeProcessor};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let processor = VolumeProcessor::new(cli);
    match processor.process() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // Allow print for the user-facing failure message
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Error: {error}");
            }
            ExitCode::FAILURE
        }
    }
}
