//! # Marklarc
//!
//! This binary is the compiler of Marklar. It combines parser, code
//! generator, and external backend invocation into a single application.
mod cli;

use cli::Cli;

use std::{fs, path::Path, path::PathBuf, process};

use log::{error, info};
use marklar::driver;

fn main() {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let source = match fs::read_to_string(&args.input_file) {
        Ok(source) => source,
        Err(err) => {
            error!(
                "Could not read file '{}': {err}",
                args.input_file.display()
            );
            process::exit(2);
        }
    };

    let output = args
        .output_file
        .unwrap_or_else(|| PathBuf::from(driver::DEFAULT_EXECUTABLE));

    if let Err(err) = driver::generate_output(&source, Path::new(driver::BITCODE_FILE)) {
        error!("{err}");
        process::exit(2);
    }

    if let Err(err) = driver::optimize_and_link(Path::new(driver::BITCODE_FILE), &output) {
        error!("{err}");
        process::exit(3);
    }

    info!("Executable complete!");
}
