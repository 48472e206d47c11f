//! docdex CLI - Documentation catalog builder.
//!
//! Provides commands for:
//! - `build`: Walk a documentation tree and write the catalog database
//! - `search`: Search the catalog
//! - `show`: Print a stored document
//! - `symbol`: Look up the document associated with a symbol

mod commands;
mod error;
mod output;
mod source;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, SearchArgs, ShowArgs, SymbolArgs};
use error::CliError;
use output::Output;

/// docdex - Documentation catalog builder.
#[derive(Parser)]
#[command(name = "docdex", version, about)]
struct Cli {
    /// Enable verbose output (per-document progress and build summaries).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the catalog database from a documentation tree.
    Build(BuildArgs),
    /// Search the catalog.
    Search(SearchArgs),
    /// Print the content of a document by row id.
    Show(ShowArgs),
    /// Show the document associated with a symbol.
    Symbol(SymbolArgs),
}

fn run(command: Commands) -> Result<(), CliError> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        match command {
            Commands::Build(args) => args.execute().await,
            Commands::Search(args) => args.execute().await,
            Commands::Show(args) => args.execute().await,
            Commands::Symbol(args) => args.execute().await,
        }
    })
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli.command) {
        output.error(&err);
        std::process::exit(1);
    }
}
