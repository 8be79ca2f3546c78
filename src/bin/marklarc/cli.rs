//! # Cli
//!
//! This module contains everything needed for parsing the CLI arguments for
//! Marklarc.

use clap::{Parser, ValueEnum};

/// Struct containing the CLI configuration for Marklarc.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The path to the Marklar source file.
    #[arg(short, long)]
    pub input_file: std::path::PathBuf,

    /// The path to the output executable.
    #[arg(short, long)]
    pub output_file: Option<std::path::PathBuf>,

    /// Specify the log level of the compiler.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    /// Parse the command line. Help output and usage errors terminate the
    /// process with exit code 1.
    pub fn init() -> Self {
        match Cli::try_parse() {
            Ok(cli) => cli,
            Err(error) => {
                let _ = error.print();
                std::process::exit(1);
            }
        }
    }
}

/// Enum for specifying the log level of Marklarc.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// A log level, where also warnings are logged.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general state of the compiler, e.g.,
    /// which pipeline stage is running.
    #[value(alias("2"))]
    Info,

    /// Log everything which happens internally in the compiler.
    #[value(alias("3"))]
    Debug,

    /// Log extra information, including full module dumps.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
