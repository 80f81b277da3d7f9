//! # mzstore Inspector
//!
//! A command-line tool for examining record store files left behind by a
//! pipeline run.
//!
//! ## Usage
//!
//! ```bash
//! # Frame count and record kinds
//! mzstore-inspect info run01.mzstore
//!
//! # Decode every frame and report failures
//! mzstore-inspect verify run01.mzstore
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use mzstore::inspect::inspect_store;

/// mzstore - Record store inspector
#[derive(Parser)]
#[command(name = "mzstore-inspect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display frame count and record kinds of a store file
    Info {
        /// Store file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Decode every frame of a store file and report failures
    Verify {
        /// Store file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Info { file } => run_info(file),
        Commands::Verify { file } => run_verify(file),
    }
}

/// Print a frame summary of a store file
fn run_info(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let report = inspect_store(&file).context("Failed to read store file")?;
    print!("{}", report.format_info());
    Ok(())
}

/// Verify every frame of a store file
fn run_verify(file: PathBuf) -> Result<()> {
    info!("mzstore Verifier");
    info!("================");
    info!("File: {}", file.display());

    match inspect_store(&file) {
        Ok(report) => {
            // Use colorized output if available
            #[cfg(feature = "colorized_output")]
            {
                println!("{}", report.format_colored());
            }

            #[cfg(not(feature = "colorized_output"))]
            {
                println!("{}", report);
            }

            // Exit with error code if verification failed
            if report.has_failures() {
                std::process::exit(1);
            }

            Ok(())
        }
        Err(e) => {
            eprintln!("Verification error: {}", e);
            std::process::exit(1);
        }
    }
}
