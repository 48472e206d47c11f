//! `docdex search`, `docdex show` and `docdex symbol` command implementations.
//!
//! Results are written to stdout; everything else goes through tracing.

#![allow(clippy::print_stdout)]

use std::io::BufRead;
use std::path::PathBuf;

use clap::Args;
use docdex_config::{CliSettings, Config};
use docdex_store::{DEFAULT_SEARCH_LIMIT, Store, StoredDocument};

use crate::error::CliError;

/// Database selection shared by lookup commands.
#[derive(Args)]
pub(crate) struct DatabaseArgs {
    /// Path to configuration file (default: auto-discover docdex.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Catalog database (overrides config).
    #[arg(short, long)]
    database: Option<PathBuf>,
}

impl DatabaseArgs {
    async fn open(self) -> Result<Store, CliError> {
        let cli_settings = CliSettings {
            database: self.database,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(database = %config.database.display(), "Opening catalog");
        Ok(Store::open(&config.database).await?)
    }
}

/// Arguments for the search command.
#[derive(Args)]
pub(crate) struct SearchArgs {
    /// Search string (`-` reads one line from stdin).
    query: String,

    /// Maximum number of results.
    #[arg(short = 'n', long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    limit: usize,

    #[command(flatten)]
    db: DatabaseArgs,
}

impl SearchArgs {
    /// Print matching documents as `ROWID TITLE` lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is empty or the database cannot be read.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let query = resolve_query(self.query, std::io::stdin().lock())?;
        let store = self.db.open().await?;

        for hit in store.search(&query, self.limit).await? {
            println!("{} {}", hit.rowid, hit.title);
        }
        Ok(())
    }
}

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Row id printed by `search`.
    rowid: i64,

    #[command(flatten)]
    db: DatabaseArgs,
}

impl ShowArgs {
    /// Print the stored content of one document.
    ///
    /// # Errors
    ///
    /// Returns an error if no document has this row id.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let store = self.db.open().await?;
        let document = store.fetch(self.rowid).await?;
        print!("{}", document.content);
        Ok(())
    }
}

/// Arguments for the symbol command.
#[derive(Args)]
pub(crate) struct SymbolArgs {
    /// Symbol to look up.
    name: String,

    #[command(flatten)]
    db: DatabaseArgs,
}

impl SymbolArgs {
    /// Print the document associated with a symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol has no associated document.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let store = self.db.open().await?;
        let document = store
            .lookup_symbol(&self.name)
            .await?
            .ok_or_else(|| CliError::Validation(format!("no document for symbol {}", self.name)))?;
        println!("{}", symbol_line(&document));
        Ok(())
    }
}

/// Replace `-` with the first line of `input`.
fn resolve_query(query: String, input: impl BufRead) -> Result<String, CliError> {
    if query != "-" {
        return Ok(query);
    }
    match input.lines().next() {
        Some(line) => Ok(line?),
        None => Ok(String::new()),
    }
}

fn symbol_line(document: &StoredDocument) -> String {
    format!("{} {}", document.rowid, document.path)
}
