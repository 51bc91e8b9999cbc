//! docmap CLI
//!
//! Command-line tools for docmap documents.
//!
//! # Commands
//!
//! - `encode` - Convert a JSON document to CBOR
//! - `decode` - Convert a CBOR document to JSON
//! - `inspect` - Summarize the fields of a document file

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// docmap command-line document tools.
#[derive(Parser)]
#[command(name = "docmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON document to CBOR
    Encode {
        /// JSON input file
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a CBOR document to JSON
    Decode {
        /// CBOR input file
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Summarize the fields of a document file
    Inspect {
        /// Document file (`.json`, anything else is read as CBOR)
        input: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode { input, output } => {
            commands::encode::run(&input, output.as_deref())?;
        }
        Commands::Decode {
            input,
            output,
            pretty,
        } => {
            commands::decode::run(&input, output.as_deref(), pretty)?;
        }
        Commands::Inspect { input, format } => {
            commands::inspect::run(&input, &format)?;
        }
        Commands::Version => {
            println!("docmap CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("docmap Core v{}", docmap_core::VERSION);
        }
    }

    Ok(())
}
